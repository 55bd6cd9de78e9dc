//! Error types for the storage backends

use thiserror::Error;

/// Failure to persist or locate a stored blob
#[derive(Error, Debug)]
pub enum StorageError {
    /// Local filesystem failure (disk full, permissions, ...)
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The remote provider rejected the request or was unreachable
    #[error("Remote storage error: {0}")]
    Remote(String),

    /// Invalid backend configuration
    #[error("Storage configuration error: {0}")]
    Configuration(String),
}

/// Type alias for storage results
pub type StorageResult<T> = Result<T, StorageError>;
