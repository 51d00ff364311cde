//! The fetcher: validation, execution and classification of one GET call.
//!
//! # Design
//! `Fetcher` holds only configuration (user agent and redirect limit) and
//! carries no connection between calls. Each call is split the same way:
//! `build_request` validates input without I/O, `execute` performs the
//! round-trip, and `parse_response` classifies a received `HttpResponse`.
//!
//! The transport client is created inside `execute` and lives only for that
//! call. It keeps no idle connections, so dropping it at the end of the call
//! closes the socket. The whole round-trip, body included, runs under
//! `tokio::time::timeout`; when the clock fires the round-trip future is
//! dropped together with its client and connection.

use std::time::Duration;

use reqwest::redirect::Policy;
use tracing::debug;

use crate::error::FetchError;
use crate::http::{FetchRequest, HttpResponse, DEFAULT_TIMEOUT, USER_AGENT};

/// Redirect hops followed before the last 3xx is returned as the final response.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Result of one fetch call: the body text or a classified failure.
pub type Outcome = Result<String, FetchError>;

/// Stateless single-shot HTTP GET client.
#[derive(Debug, Clone)]
pub struct Fetcher {
    user_agent: String,
    max_redirects: usize,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl Fetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the identifying `User-Agent` value. Checked by `build_request`.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Limit redirect hops. `0` returns the first 3xx response as final.
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn max_redirects(&self) -> usize {
        self.max_redirects
    }

    /// Fetch `url` with the default 10 second timeout.
    pub async fn fetch(&self, url: &str) -> Outcome {
        self.fetch_with_timeout(url, DEFAULT_TIMEOUT).await
    }

    pub async fn fetch_with_timeout(&self, url: &str, timeout: Duration) -> Outcome {
        let request = self.build_request(url, timeout)?;
        self.execute(request).await
    }

    /// Validate `url` and `timeout` and attach this fetcher's `User-Agent`.
    /// Touches no network.
    pub fn build_request(&self, url: &str, timeout: Duration) -> Result<FetchRequest, FetchError> {
        FetchRequest::new(url, timeout)?.with_header("user-agent", &self.user_agent)
    }

    /// Run `request` under its timeout and classify the result.
    pub async fn execute(&self, request: FetchRequest) -> Outcome {
        let timeout = request.timeout();
        let url = request.url().clone();

        debug!(%url, state = "connecting", "fetch started");
        match tokio::time::timeout(timeout, self.round_trip(request)).await {
            Err(_elapsed) => {
                debug!(%url, state = "timed_out", ?timeout, "fetch finished");
                Err(FetchError::Timeout(timeout))
            }
            Ok(Err(err)) => {
                debug!(%url, state = "transport_failed", error = %err, "fetch finished");
                Err(err)
            }
            Ok(Ok(response)) => {
                let status = response.status;
                let outcome = parse_response(response);
                let state = if outcome.is_ok() { "succeeded" } else { "http_failed" };
                debug!(%url, state, status, "fetch finished");
                outcome
            }
        }
    }

    async fn round_trip(&self, request: FetchRequest) -> Result<HttpResponse, FetchError> {
        let client = self.session()?;

        let mut builder = client.get(request.url().clone());
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| FetchError::transport(&e))?;
        let status = response.status().as_u16();
        debug!(url = %request.url(), state = "receiving_body", status, "response headers received");

        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
                (name.as_str().to_string(), value)
            })
            .collect();
        let body = response.text().await.map_err(|e| FetchError::transport(&e))?;

        Ok(HttpResponse { status, headers, body })
    }

    /// Per-call transport client. Dropping it releases its connection.
    fn session(&self) -> Result<reqwest::Client, FetchError> {
        let max_redirects = self.max_redirects;
        let policy = Policy::custom(move |attempt| {
            if attempt.previous().len() > max_redirects {
                attempt.stop()
            } else {
                attempt.follow()
            }
        });

        reqwest::Client::builder()
            .redirect(policy)
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()
            .map_err(|e| FetchError::transport(&e))
    }
}

/// Classify a received response. Only 2xx is a success; any other final
/// status, including a 3xx left after the redirect policy stopped, is `Http`.
pub fn parse_response(response: HttpResponse) -> Outcome {
    match response.status {
        200..=299 => Ok(response.body),
        status => Err(FetchError::Http {
            status,
            body: response.body,
        }),
    }
}

/// Fetch `url` with a default `Fetcher` and the default timeout.
pub async fn fetch(url: &str) -> Outcome {
    Fetcher::default().fetch(url).await
}

/// Fetch `url` with a default `Fetcher` and the given timeout.
pub async fn fetch_with_timeout(url: &str, timeout: Duration) -> Outcome {
    Fetcher::default().fetch_with_timeout(url, timeout).await
}
