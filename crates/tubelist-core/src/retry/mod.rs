//! Retry and backoff policy for watch-page retrieval.
//!
//! Error classification (timeouts, throttling, connection failures) and
//! exponential backoff decisions live here so the fetcher only reports what
//! went wrong.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
