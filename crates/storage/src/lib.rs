//! Bucketed key-value storage for reportcard.
//!
//! This crate defines the transactional protocol the metadata layer is built on:
//! - [`Database`] - Opens read-only and read-write transactions
//! - [`DbTx`] - Snapshot reads from named buckets
//! - [`DbTxMut`] - Buffered writes, committed all-or-nothing
//! - [`Encode`] / [`Decode`] - Value codec (JSON)
//! - [`MemoryDatabase`] - In-memory engine for tests and ephemeral runs
//!
//! Engines serialize write transactions (single writer) and give readers a
//! point-in-time view unaffected by concurrent commits.

mod codec;
mod error;
mod memory;
mod traits;

pub use codec::{Decode, Encode};
pub use error::DatabaseError;
pub use memory::{MemoryDatabase, MemoryTx, MemoryTxMut};
pub use traits::{Database, DbTx, DbTxMut};

/// Result type for storage operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
