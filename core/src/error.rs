//! Error types for the fetch client.
//!
//! # Design
//! One variant per failure class. `Timeout` is kept apart from `Transport` so
//! callers can tell "the server was too slow" from "the server could not be
//! reached". `Http` keeps the status code and body of the rejected response.

use std::time::Duration;

use thiserror::Error;

/// Failure half of a fetch outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The URL or timeout was rejected before any network activity.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The full request/response cycle did not finish within the timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// DNS, connect, TLS or I/O failure. Holds the full cause chain.
    #[error("{0}")]
    Transport(String),

    /// The server answered with a status that is not a success.
    #[error("status {status}")]
    Http { status: u16, body: String },
}

/// Coarse classification of a `FetchError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Timeout,
    Transport,
    Http,
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Validation(_) => ErrorKind::Validation,
            FetchError::Timeout(_) => ErrorKind::Timeout,
            FetchError::Transport(_) => ErrorKind::Transport,
            FetchError::Http { .. } => ErrorKind::Http,
        }
    }

    /// Status code for `Http` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build a `Transport` error from `err` and every error in its source chain.
    pub(crate) fn transport(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            let cause_text = cause.to_string();
            // hyper and reqwest sometimes repeat the inner message verbatim.
            if !message.ends_with(&cause_text) {
                message.push_str(": ");
                message.push_str(&cause_text);
            }
            source = cause.source();
        }
        FetchError::Transport(message)
    }
}
