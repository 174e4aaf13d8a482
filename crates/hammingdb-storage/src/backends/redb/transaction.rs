//! Redb transaction and cursor implementation.
//!
//! Cursors materialize their range eagerly. The index layer keeps many
//! hashes per key and only scans for diagnostics and counting, so ranges
//! stay small relative to the data they describe; eager collection keeps
//! the cursor free of transaction borrows.

use std::ops::Bound;

use redb::{ReadTransaction, ReadableTable, WriteTransaction};

use crate::engine::{Cursor, KeyValue, StorageError, Transaction};

use super::tables::{decode_key, encode_key, table_end_key, table_start_key, DATA_TABLE};

/// A transaction for the redb storage engine.
///
/// Wraps either a read-only or a read-write redb transaction behind the
/// unified [`Transaction`] trait.
#[allow(clippy::large_enum_variant)]
pub enum RedbTransaction {
    /// A read-only transaction.
    Read(ReadTransaction),
    /// A read-write transaction.
    Write(WriteTransaction),
}

impl RedbTransaction {
    /// Wrap a read-only redb transaction.
    pub const fn new_read(tx: ReadTransaction) -> Self {
        Self::Read(tx)
    }

    /// Wrap a read-write redb transaction.
    pub const fn new_write(tx: WriteTransaction) -> Self {
        Self::Write(tx)
    }

    /// Collect every entry of `table` whose key lies within the bounds.
    fn collect_range(
        &self,
        table: &str,
        start: Bound<&[u8]>,
        end: Bound<&[u8]>,
    ) -> Result<Vec<KeyValue>, StorageError> {
        // Translate logical bounds into a physical half-open range. A zero
        // byte appended to an encoded key is its immediate successor, which
        // turns inclusive/exclusive bounds into range endpoints.
        let phys_start = match start {
            Bound::Included(k) => encode_key(table, k),
            Bound::Excluded(k) => {
                let mut s = encode_key(table, k);
                s.push(0x00);
                s
            }
            Bound::Unbounded => table_start_key(table),
        };
        let phys_end = match end {
            Bound::Included(k) => {
                let mut e = encode_key(table, k);
                e.push(0x00);
                e
            }
            Bound::Excluded(k) => encode_key(table, k),
            Bound::Unbounded => table_end_key(table),
        };

        match self {
            Self::Read(tx) => match tx.open_table(DATA_TABLE) {
                Ok(t) => collect_entries(&t, &phys_start, &phys_end),
                Err(redb::TableError::TableDoesNotExist(_)) => Ok(Vec::new()),
                Err(e) => Err(StorageError::Internal(e.to_string())),
            },
            Self::Write(tx) => match tx.open_table(DATA_TABLE) {
                Ok(t) => collect_entries(&t, &phys_start, &phys_end),
                Err(redb::TableError::TableDoesNotExist(_)) => Ok(Vec::new()),
                Err(e) => Err(StorageError::Internal(e.to_string())),
            },
        }
    }
}

/// Read a physical key range from an open table into owned pairs.
fn collect_entries<T>(t: &T, start: &[u8], end: &[u8]) -> Result<Vec<KeyValue>, StorageError>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    let range = t.range(start..end).map_err(|e| StorageError::Internal(e.to_string()))?;

    let mut entries = Vec::new();
    for result in range {
        let (k, v) = result.map_err(|e| StorageError::Internal(e.to_string()))?;
        if let Some((_, logical_key)) = decode_key(k.value()) {
            entries.push((logical_key.to_vec(), v.value().to_vec()));
        }
    }
    Ok(entries)
}

impl Transaction for RedbTransaction {
    type Cursor<'a>
        = RedbCursor
    where
        Self: 'a;

    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let encoded = encode_key(table, key);

        match self {
            Self::Read(tx) => match tx.open_table(DATA_TABLE) {
                Ok(t) => match t.get(encoded.as_slice()) {
                    Ok(Some(value)) => Ok(Some(value.value().to_vec())),
                    Ok(None) => Ok(None),
                    Err(e) => Err(StorageError::Internal(e.to_string())),
                },
                // No data table yet means no data, which is not an error.
                Err(redb::TableError::TableDoesNotExist(_)) => Ok(None),
                Err(e) => Err(StorageError::Internal(e.to_string())),
            },
            Self::Write(tx) => match tx.open_table(DATA_TABLE) {
                Ok(t) => match t.get(encoded.as_slice()) {
                    Ok(Some(value)) => Ok(Some(value.value().to_vec())),
                    Ok(None) => Ok(None),
                    Err(e) => Err(StorageError::Internal(e.to_string())),
                },
                Err(redb::TableError::TableDoesNotExist(_)) => Ok(None),
                Err(e) => Err(StorageError::Internal(e.to_string())),
            },
        }
    }

    fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        match self {
            Self::Read(_) => Err(StorageError::ReadOnly),
            Self::Write(tx) => {
                let encoded = encode_key(table, key);
                let mut t =
                    tx.open_table(DATA_TABLE).map_err(|e| StorageError::Internal(e.to_string()))?;
                t.insert(encoded.as_slice(), value)
                    .map_err(|e| StorageError::Internal(e.to_string()))?;
                Ok(())
            }
        }
    }

    fn cursor(&self, table: &str) -> Result<Self::Cursor<'_>, StorageError> {
        self.range(table, Bound::Unbounded, Bound::Unbounded)
    }

    fn range(
        &self,
        table: &str,
        start: Bound<&[u8]>,
        end: Bound<&[u8]>,
    ) -> Result<Self::Cursor<'_>, StorageError> {
        let entries = self.collect_range(table, start, end)?;
        Ok(RedbCursor::new(entries))
    }

    fn commit(self) -> Result<(), StorageError> {
        match self {
            // Read transactions end when dropped.
            Self::Read(_) => Ok(()),
            Self::Write(tx) => tx.commit().map_err(|e| StorageError::Transaction(e.to_string())),
        }
    }

    fn rollback(self) -> Result<(), StorageError> {
        match self {
            Self::Read(_) => Ok(()),
            Self::Write(tx) => {
                drop(tx.abort());
                Ok(())
            }
        }
    }

    fn is_read_only(&self) -> bool {
        matches!(self, Self::Read(_))
    }
}

/// A cursor over an eagerly collected key range.
pub struct RedbCursor {
    entries: Vec<KeyValue>,
    /// Index of the next entry to yield; `entries.len() + 1` once exhausted.
    next_index: usize,
}

impl RedbCursor {
    fn new(entries: Vec<KeyValue>) -> Self {
        Self { entries, next_index: 0 }
    }
}

impl Cursor for RedbCursor {
    fn next(&mut self) -> Result<Option<KeyValue>, StorageError> {
        if self.next_index < self.entries.len() {
            let kv = self.entries[self.next_index].clone();
            self.next_index += 1;
            Ok(Some(kv))
        } else {
            self.next_index = self.entries.len() + 1;
            Ok(None)
        }
    }

    fn current(&self) -> Option<(&[u8], &[u8])> {
        if self.next_index == 0 || self.next_index > self.entries.len() {
            return None;
        }
        self.entries.get(self.next_index - 1).map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}
