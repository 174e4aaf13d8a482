//! Index configuration and derived partition constants.
//!
//! A database is fully described by two numbers fixed at creation time:
//! the hash width `hash_bits` and the largest Hamming distance `max_error`
//! it can answer for. The partition constants are derived from those and
//! recomputed on open, never stored.

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};

/// Smallest supported hash width in bits.
pub const MIN_HASH_BITS: u32 = 8;

/// Largest supported hash width in bits.
pub const MAX_HASH_BITS: u32 = 4096;

/// Hard cap on the partition count.
///
/// The partition index is a single key byte, so at most 256 partitions can
/// be addressed. This bounds `max_error` at 510.
pub const MAX_PARTITIONS: u32 = 256;

/// Whether a database handle accepts inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpenMode {
    /// Lookups only; inserts fail.
    ReadOnly,
    /// Lookups and inserts.
    ReadWrite,
}

/// Validated configuration of an index.
///
/// # Derived constants
///
/// * `partitions`: `(max_error + 3) / 2`. The smallest partition count for
///   which any hash within `max_error` of a query must, by pigeonhole,
///   collide with the query on one partition exactly (even `max_error`) or
///   within one bit (odd `max_error`).
/// * `partition_bits`: `ceil(hash_bits / partitions)`; the last partition
///   may cover fewer bits.
/// * `partition_key_bytes`: bytes of packed window slice carried in a
///   partition key, `ceil(partition_bits / 8) + 1`. The extra byte absorbs
///   windows that straddle a byte boundary of the hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    hash_bits: u32,
    max_error: u32,
}

impl IndexConfig {
    /// Validate a `(hash_bits, max_error)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidConfig`] if `hash_bits` is not a
    /// multiple of 8 in `8..=4096`, if `max_error` is not in
    /// `1..hash_bits`, or if the derived partition count exceeds 256.
    pub fn new(hash_bits: u32, max_error: u32) -> Result<Self> {
        if hash_bits < MIN_HASH_BITS || hash_bits > MAX_HASH_BITS || hash_bits % 8 != 0 {
            return Err(IndexError::InvalidConfig(format!(
                "hash_bits must be a multiple of 8 in {MIN_HASH_BITS}..={MAX_HASH_BITS}, got {hash_bits}"
            )));
        }
        if max_error == 0 || max_error >= hash_bits {
            return Err(IndexError::InvalidConfig(format!(
                "max_error must be in 1..hash_bits ({hash_bits}), got {max_error}"
            )));
        }

        let config = Self { hash_bits, max_error };
        if config.partitions() > MAX_PARTITIONS {
            return Err(IndexError::InvalidConfig(format!(
                "max_error {max_error} needs {} partitions; at most {MAX_PARTITIONS} are addressable",
                config.partitions()
            )));
        }
        Ok(config)
    }

    /// The hash width in bits.
    #[must_use]
    pub const fn hash_bits(&self) -> u32 {
        self.hash_bits
    }

    /// The largest Hamming distance this index answers for.
    #[must_use]
    pub const fn max_error(&self) -> u32 {
        self.max_error
    }

    /// The hash width in bytes.
    #[must_use]
    pub const fn hash_bytes(&self) -> usize {
        (self.hash_bits / 8) as usize
    }

    /// The number of partitions each hash is split into.
    #[must_use]
    pub const fn partitions(&self) -> u32 {
        (self.max_error + 3) / 2
    }

    /// The nominal partition width in bits.
    #[must_use]
    pub fn partition_bits(&self) -> u32 {
        self.hash_bits.div_ceil(self.partitions())
    }

    /// The number of window-slice bytes in a partition key.
    #[must_use]
    pub fn partition_key_bytes(&self) -> usize {
        (self.partition_bits().div_ceil(8) + 1) as usize
    }

    /// The number of hash bits actually covered by `partition`.
    ///
    /// Equal to [`partition_bits`](Self::partition_bits) for all partitions
    /// but the last, which covers whatever remains (possibly zero when the
    /// nominal widths overshoot the hash).
    #[must_use]
    pub fn window_bits(&self, partition: u32) -> u32 {
        debug_assert!(partition < self.partitions());
        let nominal = self.partition_bits();
        self.hash_bits.saturating_sub(partition * nominal).min(nominal)
    }
}
