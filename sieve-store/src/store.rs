//! Fact store abstraction.
//!
//! Provides the `FactStore` trait consumed by the dedupe and expiry stages.
//! All operations are partition-scoped: a handle addresses exactly one
//! partition's key space.

use async_trait::async_trait;
use sieve_core::{FactRecord, Timestamp};

use crate::error::StoreResult;

/// Partition-scoped fact store contract.
///
/// Implementations must guarantee that each mutation completes or fails
/// atomically as a single step; the core never leaves a half-applied
/// transition. Records must survive process restart and be visible to
/// whichever worker the partition is reassigned to — that durability is
/// the backing engine's obligation, not the caller's.
#[async_trait]
pub trait FactStore: Send + Sync {
    /// Gets the record stored for `key`.
    ///
    /// Returns `None` if no record exists.
    async fn get(&self, key: &str) -> StoreResult<Option<FactRecord>>;

    /// Inserts a record for `key` only if none exists.
    ///
    /// If no record exists, inserts `(value, timestamp)` and returns
    /// `None`. If a record exists, leaves it untouched and returns it.
    /// Atomic with respect to the single sequential caller per partition.
    async fn put_if_absent(
        &self,
        key: &str,
        value: &str,
        timestamp: Timestamp,
    ) -> StoreResult<Option<FactRecord>>;

    /// Deletes the record stored for `key`.
    ///
    /// No-op if the key has no record.
    async fn delete(&self, key: &str) -> StoreResult<()>;
}
