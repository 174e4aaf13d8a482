//! Core storage engine traits.

use std::ops::Bound;

use super::StorageError;

/// An owned key-value pair returned by cursors.
pub type KeyValue = (Vec<u8>, Vec<u8>);

/// A storage engine that provides transactional key-value operations.
pub trait StorageEngine: Send + Sync {
    /// The transaction type for this engine.
    type Transaction<'a>: Transaction
    where
        Self: 'a;

    /// Begin a read-only transaction.
    fn begin_read(&self) -> Result<Self::Transaction<'_>, StorageError>;

    /// Begin a read-write transaction.
    fn begin_write(&self) -> Result<Self::Transaction<'_>, StorageError>;
}

/// A transaction over a set of logical tables.
///
/// Tables are namespaces within one keyspace; a key is unique within its
/// table. Writes become visible to other transactions only after [`commit`].
///
/// [`commit`]: Transaction::commit
pub trait Transaction {
    /// The cursor type for range iteration.
    type Cursor<'a>: Cursor
    where
        Self: 'a;

    /// Get a value by key from a table.
    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Put a key-value pair into a table, replacing any existing value.
    fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Create a cursor over all entries of a table, in key order.
    fn cursor(&self, table: &str) -> Result<Self::Cursor<'_>, StorageError>;

    /// Create a cursor over a key range of a table, in key order.
    fn range(
        &self,
        table: &str,
        start: Bound<&[u8]>,
        end: Bound<&[u8]>,
    ) -> Result<Self::Cursor<'_>, StorageError>;

    /// Commit the transaction.
    fn commit(self) -> Result<(), StorageError>;

    /// Roll the transaction back, discarding its writes.
    fn rollback(self) -> Result<(), StorageError>;

    /// Whether this transaction rejects writes.
    fn is_read_only(&self) -> bool;
}

/// A cursor yielding key-value pairs in ascending key order.
pub trait Cursor {
    /// Advance to the next pair, returning it, or `None` past the end.
    fn next(&mut self) -> Result<Option<KeyValue>, StorageError>;

    /// The pair the cursor is currently positioned on, if any.
    fn current(&self) -> Option<(&[u8], &[u8])>;
}
