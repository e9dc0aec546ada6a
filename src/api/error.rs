use thiserror::Error;

/// Errors from the remote schedule feed.
///
/// A failed fetch fails the whole category refresh; nothing is written
/// locally and the last-known-good snapshot keeps serving. Retry policy
/// belongs to the caller.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("feed returned status {0}")]
    Status(reqwest::StatusCode),
}
