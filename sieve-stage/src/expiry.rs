//! Expiry stage: honor tombstones while the stored record is fresh.
//!
//! An expire event removes the fact record only while the record is still
//! within the grace window of its creation. Once a record has survived
//! past that window, expire events targeting it are permanent no-ops and
//! the key remains present indefinitely.
//!
//! Per-key state machine, combined with the dedupe stage:
//! `PRESENT --expire (fresh)--> ABSENT`;
//! `PRESENT --expire (stale)--> PRESENT` (no-op);
//! `ABSENT --expire (any)--> ABSENT` (no-op).

use sieve_core::ExpireEvent;
use sieve_store::FactStore;

use crate::error::StageResult;

/// Outcome of processing one expire event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryOutcome {
    /// The stored record was within its grace window and was deleted.
    Removed,
    /// The stored record outlived its grace window and was left in place.
    Retained,
    /// No record was stored for the key; nothing to expire.
    Absent,
}

/// Stage that conditionally deletes fact records on expire events.
#[derive(Debug)]
pub struct ExpiryStage<S> {
    /// Partition-scoped fact store handle.
    store: S,
    /// Grace window in milliseconds.
    grace_ms: u64,
}

impl<S: FactStore> ExpiryStage<S> {
    /// Creates an expiry stage over a partition-scoped store handle.
    #[must_use]
    pub const fn new(store: S, grace_ms: u64) -> Self {
        Self { store, grace_ms }
    }

    /// Returns the configured grace window in milliseconds.
    #[must_use]
    pub const fn grace_ms(&self) -> u64 {
        self.grace_ms
    }

    /// Processes one expire event.
    ///
    /// The event's timestamp is compared to the stored record's creation
    /// time exactly as received, even if event times are not monotonic.
    ///
    /// # Errors
    ///
    /// Returns an error if a store operation fails. The record is then
    /// left exactly as it was.
    pub async fn process(&self, event: &ExpireEvent) -> StageResult<ExpiryOutcome> {
        let Some(record) = self.store.get(&event.key).await? else {
            return Ok(ExpiryOutcome::Absent);
        };

        // Delete only while the record is younger than the grace window;
        // a record whose boundary has passed stays present forever.
        let boundary = record.timestamp.saturating_add_millis(self.grace_ms);
        if boundary < event.event_time {
            return Ok(ExpiryOutcome::Retained);
        }

        self.store.delete(&event.key).await?;
        Ok(ExpiryOutcome::Removed)
    }
}
