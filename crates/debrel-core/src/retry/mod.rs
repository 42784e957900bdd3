//! Retry and backoff for the upstream download.
//!
//! Failures are classified (timeouts, throttling, connection failures) and
//! retried with capped exponential backoff; anything else fails immediately.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
