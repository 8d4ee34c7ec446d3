//! Error types shared by storage backends and the collection index.

use thiserror::Error;

/// Failure reported by a storage backend.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Malformed data: {0}")]
    Malformed(String),
}

/// Errors returned by collection index operations.
#[derive(Debug, Clone, Error)]
pub enum IndexError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<StoreError> for IndexError {
    fn from(err: StoreError) -> Self {
        IndexError::StorageUnavailable(err.to_string())
    }
}
