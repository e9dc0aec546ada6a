use thiserror::Error;

/// Errors surfaced by the persistent store.
///
/// Storage failures are not retried internally; they propagate to the
/// caller, who decides whether to re-run the operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing directory could not be read or written (missing
    /// permissions, disk full, storage disabled).
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] std::io::Error),

    /// A stored record could not be decoded.
    #[error("corrupt record in store: {0}")]
    Corrupt(#[from] serde_json::Error),
}
