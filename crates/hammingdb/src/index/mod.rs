//! The persistent Hamming index.
//!
//! On insert a fingerprint fans out into one record append per partition.
//! On lookup the query fans out into `P * (1 + W)` point reads (the exact
//! partition key plus every 1-bit window variant) whose results stream
//! into a candidate map, get filtered by the partition-match admission
//! rule, and are confirmed by a full Hamming distance computation. Only
//! exact partition keys are ever stored; the 1-bit variants exist purely
//! as probes, trading a wider read fan-out for a much smaller database.

mod candidates;

use std::fmt;
use std::io;
use std::ops::Bound;
use std::path::Path;

use tracing::debug;

use hammingdb_storage::backends::RedbEngine;
use hammingdb_storage::{Cursor, StorageEngine, Transaction};

use crate::config::{IndexConfig, OpenMode};
use crate::distance::hamming_distance;
use crate::encoding::{
    decode_partition_key, encode_partition_key, partition_prefix, toggle_window_bit,
    KEY_HASH_BITS, KEY_MAX_ERROR,
};
use crate::error::{IndexError, Result};
use crate::types::Fingerprint;

use candidates::{CandidateSet, MatchQuality};

/// Logical storage table holding the whole index: config records and
/// partition records share one keyspace, as in the original flat layout.
const TABLE_INDEX: &str = "hamming_index";

/// A stored fingerprint returned by a lookup, with its Hamming distance
/// to the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The stored fingerprint.
    pub fingerprint: Fingerprint,
    /// Its exact Hamming distance to the query.
    pub distance: u32,
}

/// A handle to a Hamming-distance index over a storage engine.
///
/// The handle owns the engine exclusively. One writer at a time; readers
/// may share a handle through `&self` lookups as long as no insert runs
/// concurrently on another clone of the engine.
///
/// # Example
///
/// ```
/// use hammingdb::{Fingerprint, HammingIndex, IndexConfig};
///
/// let index = HammingIndex::create_in_memory(IndexConfig::new(32, 4)?)?;
///
/// index.insert(&Fingerprint::from_hex("deadbeef")?)?;
///
/// let matches = index.lookup(&Fingerprint::from_hex("deadbeee")?)?;
/// assert_eq!(matches.len(), 1);
/// assert_eq!(matches[0].distance, 1);
/// # Ok::<(), hammingdb::IndexError>(())
/// ```
pub struct HammingIndex<E: StorageEngine = RedbEngine> {
    engine: E,
    config: IndexConfig,
    mode: OpenMode,
}

impl HammingIndex<RedbEngine> {
    /// Create a new index database at `path` and close it again.
    ///
    /// The configuration is persisted and immutable afterwards; use
    /// [`open`](Self::open) to get a working handle.
    ///
    /// # Errors
    ///
    /// Fails if `path` already exists or the store cannot be written.
    pub fn create(path: impl AsRef<Path>, config: IndexConfig) -> Result<()> {
        let path = path.as_ref();
        let engine = RedbEngine::create_new(path)?;
        Self::initialize(&engine, config)?;
        debug!(
            path = %path.display(),
            hash_bits = config.hash_bits(),
            max_error = config.max_error(),
            "created index database"
        );
        Ok(())
    }

    /// Open an existing index database at `path`.
    ///
    /// # Errors
    ///
    /// Fails if `path` does not hold a database or its configuration
    /// records are missing or unreadable.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref();
        let engine = RedbEngine::open(path)?;
        let index = Self::from_engine(engine, mode)?;
        debug!(
            path = %path.display(),
            hash_bits = index.config.hash_bits(),
            max_error = index.config.max_error(),
            "opened index database"
        );
        Ok(index)
    }

    /// Create a fully functional in-memory index, for tests and ephemeral
    /// use. Contents are lost when the handle is dropped.
    ///
    /// # Errors
    ///
    /// Fails if the in-memory store cannot be set up.
    pub fn create_in_memory(config: IndexConfig) -> Result<Self> {
        let engine = RedbEngine::in_memory()?;
        Self::initialize(&engine, config)?;
        Self::from_engine(engine, OpenMode::ReadWrite)
    }
}

impl<E: StorageEngine> HammingIndex<E> {
    /// Write the configuration records into a fresh engine.
    ///
    /// Records are written exactly once here and never mutated.
    ///
    /// # Errors
    ///
    /// Fails if the storage engine rejects the writes.
    pub fn initialize(engine: &E, config: IndexConfig) -> Result<()> {
        let mut tx = engine.begin_write()?;
        tx.put(TABLE_INDEX, KEY_HASH_BITS, config.hash_bits().to_string().as_bytes())?;
        tx.put(TABLE_INDEX, KEY_MAX_ERROR, config.max_error().to_string().as_bytes())?;
        tx.commit()?;
        Ok(())
    }

    /// Construct a handle over an engine holding an initialized index.
    ///
    /// Reads the persisted configuration and rederives all partition
    /// constants from it.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::ConfigMissing`] if the configuration records
    /// are absent, unparseable, or describe an invalid configuration.
    pub fn from_engine(engine: E, mode: OpenMode) -> Result<Self> {
        let config = {
            let tx = engine.begin_read()?;
            let hash_bits = read_config_record(&tx, KEY_HASH_BITS)?;
            let max_error = read_config_record(&tx, KEY_MAX_ERROR)?;
            IndexConfig::new(hash_bits, max_error)
                .map_err(|e| IndexError::ConfigMissing(e.to_string()))?
        };
        Ok(Self { engine, config, mode })
    }

    /// The index configuration.
    #[must_use]
    pub const fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// The mode this handle was opened with.
    #[must_use]
    pub const fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Insert a fingerprint.
    ///
    /// Duplicate inserts are permitted; lookups still return the
    /// fingerprint once.
    ///
    /// # Errors
    ///
    /// Fails on a read-only handle, on a width mismatch, or if storage
    /// fails. All partition writes commit atomically, so a failed insert
    /// leaves no partial state.
    pub fn insert(&self, fingerprint: &Fingerprint) -> Result<()> {
        self.insert_many(std::slice::from_ref(fingerprint))
    }

    /// Insert a batch of fingerprints in one storage transaction.
    ///
    /// # Errors
    ///
    /// As [`insert`](Self::insert); on any error the whole batch is
    /// rolled back.
    pub fn insert_many(&self, fingerprints: &[Fingerprint]) -> Result<()> {
        if self.mode == OpenMode::ReadOnly {
            return Err(IndexError::ReadOnly);
        }
        for fingerprint in fingerprints {
            self.check_width(fingerprint)?;
        }
        if fingerprints.is_empty() {
            return Ok(());
        }

        let mut tx = self.engine.begin_write()?;
        for fingerprint in fingerprints {
            for partition in 0..self.config.partitions() {
                let (key, _) = encode_partition_key(&self.config, fingerprint.as_bytes(), partition);
                let mut record = tx.get(TABLE_INDEX, &key)?.unwrap_or_default();
                record.extend_from_slice(fingerprint.as_bytes());
                tx.put(TABLE_INDEX, &key, &record)?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Find every stored fingerprint within the configured max error of
    /// `query`, with its exact distance.
    ///
    /// Results are deduplicated and come in bytewise fingerprint order.
    ///
    /// # Errors
    ///
    /// Fails on a width mismatch or if any probe read fails; no partial
    /// result is returned.
    pub fn lookup(&self, query: &Fingerprint) -> Result<Vec<Match>> {
        self.lookup_impl(query, self.config.max_error())
    }

    /// Like [`lookup`](Self::lookup), but with a tighter distance cap.
    ///
    /// `max_error` values above the configured one are clamped to it; a
    /// cap of 0 returns exact matches only.
    ///
    /// # Errors
    ///
    /// As [`lookup`](Self::lookup).
    pub fn lookup_within(&self, query: &Fingerprint, max_error: u32) -> Result<Vec<Match>> {
        self.lookup_impl(query, max_error.min(self.config.max_error()))
    }

    fn lookup_impl(&self, query: &Fingerprint, limit: u32) -> Result<Vec<Match>> {
        self.check_width(query)?;

        let tx = self.engine.begin_read()?;
        let mut candidates = CandidateSet::new(self.config.hash_bytes());

        for partition in 0..self.config.partitions() {
            let (mut key, window) =
                encode_partition_key(&self.config, query.as_bytes(), partition);

            if let Some(record) = tx.get(TABLE_INDEX, &key)? {
                candidates.add_record(&record, MatchQuality::Exact);
            }

            for bit in 0..window {
                toggle_window_bit(&self.config, &mut key, partition, bit);
                if let Some(record) = tx.get(TABLE_INDEX, &key)? {
                    candidates.add_record(&record, MatchQuality::Flipped);
                }
                toggle_window_bit(&self.config, &mut key, partition, bit);
            }
        }

        let odd_max_error = self.config.max_error() % 2 == 1;
        let mut matches = Vec::new();
        for (hash, candidate) in candidates.iter() {
            if !candidate.is_admissible(odd_max_error) {
                continue;
            }
            let distance = hamming_distance(query.as_bytes(), hash);
            if distance <= limit {
                matches.push(Match { fingerprint: Fingerprint::from(hash), distance });
            }
        }
        Ok(matches)
    }

    /// The number of stored fingerprints, duplicates included.
    ///
    /// Every fingerprint appears exactly once in partition 0's records,
    /// so a scan of that partition suffices.
    ///
    /// # Errors
    ///
    /// Fails if the storage scan fails.
    pub fn count(&self) -> Result<usize> {
        let tx = self.engine.begin_read()?;

        let start = partition_prefix(0);
        let end = partition_prefix(1);
        let mut cursor =
            tx.range(TABLE_INDEX, Bound::Included(&start[..]), Bound::Excluded(&end[..]))?;

        let mut total = 0;
        while let Some((_, record)) = cursor.next()? {
            total += record.len() / self.config.hash_bytes();
        }
        Ok(total)
    }

    /// Write a human-readable listing of every partition record: the
    /// partition index, the hex window slice, and the hex of each stored
    /// hash. A debugging aid, not part of the functional contract.
    ///
    /// # Errors
    ///
    /// Fails if the storage scan or the writer fails.
    pub fn dump(&self, out: &mut impl io::Write) -> Result<()> {
        let tx = self.engine.begin_read()?;
        let mut cursor = tx.cursor(TABLE_INDEX)?;

        while let Some((key, record)) = cursor.next()? {
            let Some((partition, slice)) = decode_partition_key(&self.config, &key) else {
                continue;
            };
            writeln!(out, "partition {partition} {}", hex::encode(slice))?;
            for hash in record.chunks_exact(self.config.hash_bytes()) {
                writeln!(out, "    {}", hex::encode(hash))?;
            }
        }
        Ok(())
    }

    /// Close the index, releasing the underlying store.
    ///
    /// Dropping the handle has the same effect; this method only makes
    /// the release explicit at call sites.
    pub fn close(self) {}

    fn check_width(&self, fingerprint: &Fingerprint) -> Result<()> {
        if fingerprint.len() != self.config.hash_bytes() {
            return Err(IndexError::FingerprintLength {
                expected: self.config.hash_bytes(),
                actual: fingerprint.len(),
            });
        }
        Ok(())
    }
}

impl<E: StorageEngine> fmt::Debug for HammingIndex<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HammingIndex")
            .field("config", &self.config)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Read and parse one ASCII-decimal config record.
fn read_config_record<T: Transaction>(tx: &T, key: &[u8]) -> Result<u32> {
    let name = String::from_utf8_lossy(key).into_owned();
    let value = tx
        .get(TABLE_INDEX, key)?
        .ok_or_else(|| IndexError::ConfigMissing(format!("record {name} absent")))?;
    std::str::from_utf8(&value)
        .ok()
        .and_then(|text| text.parse::<u32>().ok())
        .ok_or_else(|| IndexError::ConfigMissing(format!("record {name} unparseable")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(bits: u32, err: u32) -> HammingIndex {
        HammingIndex::create_in_memory(IndexConfig::new(bits, err).unwrap()).unwrap()
    }

    #[test]
    fn insert_then_lookup_self() {
        let index = index(32, 4);
        let fp = Fingerprint::from_hex("deadbeef").unwrap();

        index.insert(&fp).unwrap();
        let matches = index.lookup(&fp).unwrap();
        assert_eq!(matches, vec![Match { fingerprint: fp, distance: 0 }]);
    }

    #[test]
    fn empty_database_returns_no_matches() {
        let index = index(32, 4);
        let matches = index.lookup(&Fingerprint::from_hex("deadbeef").unwrap()).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn duplicate_inserts_are_deduplicated_in_results() {
        let index = index(16, 3);
        let fp = Fingerprint::from_hex("00ff").unwrap();

        index.insert(&fp).unwrap();
        index.insert(&fp).unwrap();

        let matches = index.lookup(&fp).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(index.count().unwrap(), 2);
    }

    #[test]
    fn wrong_width_is_rejected() {
        let index = index(32, 4);
        let narrow = Fingerprint::from_hex("dead").unwrap();

        let err = index.insert(&narrow).unwrap_err();
        assert!(matches!(err, IndexError::FingerprintLength { expected: 4, actual: 2 }));

        let err = index.lookup(&narrow).unwrap_err();
        assert!(matches!(err, IndexError::FingerprintLength { .. }));
    }

    #[test]
    fn uninitialized_engine_is_config_missing() {
        let engine = hammingdb_storage::backends::RedbEngine::in_memory().unwrap();
        let err = HammingIndex::from_engine(engine, OpenMode::ReadWrite).unwrap_err();
        assert!(matches!(err, IndexError::ConfigMissing(_)));
    }

    #[test]
    fn insert_many_is_visible_at_once() {
        let index = index(16, 3);
        let fps: Vec<Fingerprint> =
            (0u16..8).map(|i| Fingerprint::new(i.to_be_bytes().to_vec())).collect();

        index.insert_many(&fps).unwrap();
        assert_eq!(index.count().unwrap(), 8);

        let matches = index.lookup(&fps[0]).unwrap();
        assert!(matches.iter().any(|m| m.fingerprint == fps[0] && m.distance == 0));
    }

    #[test]
    fn dump_lists_partitions_and_hashes() {
        let index = index(16, 3);
        index.insert(&Fingerprint::from_hex("00ff").unwrap()).unwrap();

        let mut out = Vec::new();
        index.dump(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        // One line per partition key plus one per stored hash.
        assert_eq!(text.lines().filter(|l| l.starts_with("partition ")).count(), 3);
        assert_eq!(text.lines().filter(|l| l.trim() == "00ff").count(), 3);
    }

    #[test]
    fn config_is_preserved() {
        let index = index(64, 6);
        assert_eq!(index.config().hash_bits(), 64);
        assert_eq!(index.config().max_error(), 6);
        assert_eq!(index.mode(), OpenMode::ReadWrite);
    }
}
