//! Page retrieval error type for retry classification.

/// Error returned by a single watch-page request. Classified before being
/// collapsed into an empty description.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Transfer succeeded with an empty body.
    #[error("empty response body")]
    EmptyBody,
}
