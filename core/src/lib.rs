//! Asynchronous single-shot HTTP fetch.
//!
//! # Overview
//! Issues one GET request, bounds the whole round-trip with a timeout, and
//! returns the body as text or a classified `FetchError`.
//!
//! # Design
//! - `Fetcher` holds configuration only; each call builds and drops its own
//!   transport client, so no connection outlives the call.
//! - Each call goes through `build_request` (validation, no I/O), `execute`
//!   (round-trip under `tokio::time::timeout`) and `parse_response`
//!   (status classification on plain data).
//! - Nothing is logged above `debug`; failures are returned, never reported.

pub mod client;
pub mod error;
pub mod http;

pub use client::{fetch, fetch_with_timeout, parse_response, Fetcher, Outcome, DEFAULT_MAX_REDIRECTS};
pub use error::{ErrorKind, FetchError};
pub use http::{timeout_from_secs, FetchRequest, HttpResponse, DEFAULT_TIMEOUT, USER_AGENT};
