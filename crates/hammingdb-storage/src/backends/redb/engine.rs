//! Redb storage engine implementation.

use std::path::Path;

use redb::Database;

use crate::engine::{StorageEngine, StorageError};

use super::transaction::RedbTransaction;

/// A storage engine backed by redb.
///
/// Every write transaction is durable on commit; read transactions see a
/// consistent snapshot of the last committed state.
///
/// # Example
///
/// ```ignore
/// use hammingdb_storage::backends::RedbEngine;
/// use hammingdb_storage::Transaction;
///
/// let engine = RedbEngine::create_new("index.redb")?;
/// let mut tx = engine.begin_write()?;
/// tx.put("meta", b"_hb", b"64")?;
/// tx.commit()?;
/// ```
pub struct RedbEngine {
    db: Database,
}

impl RedbEngine {
    /// Create a new database file at `path`, failing if it already exists.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the path exists or the database
    /// cannot be created.
    pub fn create_new(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if path.exists() {
            return Err(StorageError::Open(format!("{} already exists", path.display())));
        }
        let db = Database::builder()
            .create(path)
            .map_err(|e| StorageError::Open(e.to_string()))?;
        Ok(Self { db })
    }

    /// Open an existing database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the path does not exist, or
    /// [`StorageError::Open`] if it is not a valid database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StorageError::NotFound(path.display().to_string()));
        }
        let db = Database::open(path).map_err(|e| StorageError::Open(e.to_string()))?;
        Ok(Self { db })
    }

    /// Create an in-memory database, lost when the engine is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be created.
    pub fn in_memory() -> Result<Self, StorageError> {
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(|e| StorageError::Open(e.to_string()))?;
        Ok(Self { db })
    }
}

impl StorageEngine for RedbEngine {
    type Transaction<'a> = RedbTransaction;

    fn begin_read(&self) -> Result<Self::Transaction<'_>, StorageError> {
        let tx = self.db.begin_read().map_err(|e| StorageError::Transaction(e.to_string()))?;
        Ok(RedbTransaction::new_read(tx))
    }

    fn begin_write(&self) -> Result<Self::Transaction<'_>, StorageError> {
        let tx = self.db.begin_write().map_err(|e| StorageError::Transaction(e.to_string()))?;
        Ok(RedbTransaction::new_write(tx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Transaction;

    #[test]
    fn in_memory_write_and_read() {
        let engine = RedbEngine::in_memory().expect("failed to create in-memory db");

        {
            let mut tx = engine.begin_write().expect("begin write");
            tx.put("t", b"key", b"value").expect("put");
            tx.commit().expect("commit");
        }

        {
            let tx = engine.begin_read().expect("begin read");
            assert!(tx.is_read_only());
            let value = tx.get("t", b"key").expect("get");
            assert_eq!(value, Some(b"value".to_vec()));
        }
    }

    #[test]
    fn open_missing_path_is_not_found() {
        let err = RedbEngine::open("/nonexistent/of/course.redb").err().expect("must fail");
        assert!(err.is_not_found());
    }
}
