//! `hammingdb` storage
//!
//! Storage engine abstraction and backend implementations for `hammingdb`.
//!
//! The index layer only needs an ordered key-value store with point reads,
//! point writes and range scans, wrapped in transactions. The [`engine`]
//! module defines that contract; [`backends`] provides the [`redb`] -based
//! implementation used in production and an in-memory variant for tests.
//!
//! # Modules
//!
//! - [`engine`] - Storage engine traits and error types
//! - [`backends`] - Concrete storage backend implementations

pub mod backends;
pub mod engine;

pub use engine::{Cursor, KeyValue, StorageEngine, StorageError, StorageResult, Transaction};
