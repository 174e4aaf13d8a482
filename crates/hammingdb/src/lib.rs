//! # hammingdb
//!
//! A persistent index for approximate nearest-neighbor lookups over
//! fixed-width binary hashes (perceptual image fingerprints, SimHashes)
//! under the Hamming distance, implementing the HmSearch scheme described
//! in
//!
//! > Zhang, Qin, Wang, Xue, Shan, **HmSearch: an efficient Hamming distance
//! > query processing algorithm**, *SSDBM*, 2013.
//!
//! Each stored hash is split into partitions and indexed once per
//! partition in an embedded key-value store. A query recovers everything
//! within distance K by probing each partition key and its 1-bit variants,
//! then validating candidates by the pigeonhole structure of their
//! partition matches. Unlike the paper, only exact partition keys are
//! stored; 1-bit variants are generated at query time, which keeps the
//! database small at the cost of a wider read fan-out.
//!
//! Results are exact: every stored hash within the distance bound is
//! returned with its true distance, and nothing else.
//!
//! ## Example
//!
//! ```
//! use hammingdb::{Fingerprint, HammingIndex, IndexConfig};
//!
//! // 64-bit hashes, answering lookups up to distance 6.
//! let index = HammingIndex::create_in_memory(IndexConfig::new(64, 6)?)?;
//!
//! index.insert(&Fingerprint::from_hex("35d32a6d4a1b4f72")?)?;
//!
//! // One bit off; found with distance 1.
//! let matches = index.lookup(&Fingerprint::from_hex("35d32a6d4a1b4f73")?)?;
//! assert_eq!(matches[0].distance, 1);
//! # Ok::<(), hammingdb::IndexError>(())
//! ```
//!
//! On-disk databases work the same through [`HammingIndex::create`] and
//! [`HammingIndex::open`]; the configuration is fixed at creation time
//! and reread on every open.
//!
//! ## Modules
//!
//! - [`index`] - The index handle: lifecycle, insert, lookup
//! - [`config`] - Configuration and derived partition constants
//! - [`types`] - The [`Fingerprint`] value type
//! - [`encoding`] - Partition key layout
//! - [`distance`] - Hamming distance primitive
//! - [`error`] - Error types

pub mod config;
pub mod distance;
pub mod encoding;
pub mod error;
pub mod index;
pub mod types;

pub use config::{IndexConfig, OpenMode};
pub use error::{IndexError, Result};
pub use index::{HammingIndex, Match};
pub use types::Fingerprint;
