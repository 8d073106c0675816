//! Sieve Store - the fact store contract and its in-memory implementation.
//!
//! The fact store is a partitioned, timestamped key-value store holding at
//! most one record per key. The durable engine behind it (persistence
//! format, compaction, replication) is an external concern; this crate
//! specifies the operational contract the processing core consumes, and
//! provides a shared-state in-memory implementation with deterministic
//! fault injection for tests and local runs.
//!
//! # Partition scoping
//!
//! Handles are acquired per partition ([`MemoryFactStore::acquire`]) and
//! passed to the stages at assignment time. Exactly one worker drives a
//! partition's handle at any time, so the atomicity of `put_if_absent` is
//! only required with respect to that single sequential caller.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod memory;
mod store;

pub use error::{StoreError, StoreResult};
pub use memory::{FaultConfig, MemoryFactStore, PartitionStore};
pub use store::FactStore;
