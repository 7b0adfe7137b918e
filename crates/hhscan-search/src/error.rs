use thiserror::Error;

/// Errors raised while flushing buffered places.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The place store rejected the batch.
    #[error("place store write failed: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("snapshot write failed: {0}")]
    Snapshot(#[from] csv::Error),

    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that abort a search run.
///
/// Provider failures never appear here; they degrade to empty results.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Sink(#[from] SinkError),
}
