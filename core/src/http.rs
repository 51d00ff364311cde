//! Request and response descriptors for a single fetch.
//!
//! # Design
//! `FetchRequest` is the validated, immutable description of one GET call:
//! the target URL, the timeout bounding the whole round-trip, and the headers
//! to send. It can only be obtained through validation (`FetchRequest::new`),
//! so every value that reaches the network step is already well-formed.
//!
//! `HttpResponse` is the received response as plain data. The network step
//! produces it and `parse_response` classifies it, which keeps classification
//! testable without a socket.

use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

use crate::error::FetchError;

/// Timeout applied when the caller does not pick one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Identifying `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("fetch-core/", env!("CARGO_PKG_VERSION"));

/// A validated GET request. Created per call and consumed by the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    url: Url,
    timeout: Duration,
    headers: Vec<(String, String)>,
}

impl FetchRequest {
    /// Validate `url` and `timeout` and attach the default `User-Agent`.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let url = parse_url(url)?;
        if timeout.is_zero() {
            return Err(FetchError::Validation("timeout must be positive".to_string()));
        }
        Ok(Self {
            url,
            timeout,
            headers: vec![("user-agent".to_string(), USER_AGENT.to_string())],
        })
    }

    /// Add a header, replacing any earlier header with the same name.
    ///
    /// Names are stored lowercased. Returns `Validation` if the name or value
    /// is not legal on the wire.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, FetchError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| FetchError::Validation(format!("invalid header name `{name}`")))?;
        HeaderValue::from_str(value)
            .map_err(|_| FetchError::Validation(format!("invalid value for header `{name}`")))?;

        let name = name.as_str().to_string();
        self.headers.retain(|(existing, _)| *existing != name);
        self.headers.push((name, value.to_string()));
        Ok(self)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

/// A received HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Convert a fractional number of seconds into a timeout.
///
/// Zero, negative, NaN and infinite values are rejected.
pub fn timeout_from_secs(secs: f64) -> Result<Duration, FetchError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(FetchError::Validation(format!(
            "timeout must be a positive number of seconds, got {secs}"
        )));
    }
    let timeout = Duration::try_from_secs_f64(secs)
        .map_err(|e| FetchError::Validation(format!("invalid timeout {secs}: {e}")))?;
    // Sub-nanosecond values round down to zero.
    if timeout.is_zero() {
        return Err(FetchError::Validation(format!("timeout {secs}s is too small")));
    }
    Ok(timeout)
}

fn parse_url(raw: &str) -> Result<Url, FetchError> {
    if raw.trim().is_empty() {
        return Err(FetchError::Validation("url must not be empty".to_string()));
    }
    let url = Url::parse(raw).map_err(|e| FetchError::Validation(format!("invalid url `{raw}`: {e}")))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(FetchError::Validation(format!(
                "unsupported scheme `{other}` in `{raw}`, expected http or https"
            )))
        }
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(FetchError::Validation(format!("url `{raw}` has no host")));
    }
    Ok(url)
}
