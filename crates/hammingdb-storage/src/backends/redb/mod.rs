//! Redb storage backend.
//!
//! [Redb](https://docs.rs/redb) is a pure-Rust embedded database with ACID
//! transactions. This backend multiplexes the logical tables of the
//! [`Transaction`](crate::engine::Transaction) contract onto a single
//! physical redb table by prefixing keys with the table name.

mod engine;
mod tables;
mod transaction;

pub use engine::RedbEngine;
pub use transaction::{RedbCursor, RedbTransaction};
