//! Storage error types.

use thiserror::Error;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database could not be created or opened.
    #[error("failed to open database: {0}")]
    Open(String),

    /// The database file does not exist.
    #[error("database not found: {0}")]
    NotFound(String),

    /// A transaction failed to begin, commit, or roll back.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// A write operation was attempted on a read-only transaction.
    #[error("cannot write in read-only transaction")]
    ReadOnly,

    /// The database is corrupted.
    #[error("database corruption detected: {0}")]
    Corruption(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error occurred in the storage backend.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Returns `true` if this error means the database does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` if retrying the operation may succeed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Transaction(_) | Self::Io(_))
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
