//! Error types for `hammingdb`.

use thiserror::Error;

use hammingdb_storage::StorageError;

/// Errors that can occur when creating, opening, or querying an index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The configuration is out of range (hash width or max error).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A fingerprint argument does not match the configured hash width.
    #[error("fingerprint length mismatch: expected {expected} bytes, got {actual}")]
    FingerprintLength {
        /// The configured hash width in bytes.
        expected: usize,
        /// The length of the fingerprint that was passed.
        actual: usize,
    },

    /// A configuration record is missing or unreadable on open.
    ///
    /// The database is treated as corrupted; it was either never
    /// initialized or written by something else.
    #[error("configuration record missing or unreadable: {0}")]
    ConfigMissing(String),

    /// An insert was attempted through a read-only handle.
    #[error("cannot insert through a read-only handle")]
    ReadOnly,

    /// A hex fingerprint string could not be decoded.
    #[error("invalid hex fingerprint: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The underlying storage engine failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Writing diagnostic output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;
