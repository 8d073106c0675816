//! Dedupe stage: forward only first-seen add events.
//!
//! The stage marks every processed key in the fact store with a sentinel
//! record via `put_if_absent`. The atomic check-and-insert doubles as the
//! first-seen test: an absent previous record means the key was unseen and
//! the event is forwarded unchanged; an existing record means the key was
//! already seen and the event is dropped.
//!
//! Per-key state machine: `ABSENT --add--> PRESENT` (forward);
//! `PRESENT --add--> PRESENT` (self-loop, drop). No other transitions
//! originate here.

use sieve_core::{AddEvent, OutputRecord, Timestamp};
use sieve_store::FactStore;

use crate::error::StageResult;

/// Sentinel value stored for every seen key.
///
/// The stored value is never read back for content; presence of the
/// record is the signal. The sentinel keeps stored entries small.
pub const SEEN_SENTINEL: &str = "SEEN";

/// Decision produced by processing one add event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardDecision {
    /// The key was first-seen: forward this record downstream.
    Forward(OutputRecord),
    /// The key was already seen: drop the event.
    Drop,
}

impl ForwardDecision {
    /// Returns the record to forward, if any.
    #[must_use]
    pub const fn forwarded(&self) -> Option<&OutputRecord> {
        match self {
            Self::Forward(record) => Some(record),
            Self::Drop => None,
        }
    }
}

/// Stage that forwards only the first add event per key.
///
/// Holds the partition-scoped store handle it was assigned; the stage
/// itself is stateless.
#[derive(Debug)]
pub struct DedupeStage<S> {
    /// Partition-scoped fact store handle.
    store: S,
}

impl<S: FactStore> DedupeStage<S> {
    /// Creates a dedupe stage over a partition-scoped store handle.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Processes one add event.
    ///
    /// `now` is the stage's current processing time; it becomes the stored
    /// record's creation timestamp when the key is first-seen.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails. The event is then
    /// neither recorded nor forwarded.
    pub async fn process(&self, event: &AddEvent, now: Timestamp) -> StageResult<ForwardDecision> {
        let previous = self
            .store
            .put_if_absent(&event.key, SEEN_SENTINEL, now)
            .await?;

        if previous.is_none() {
            return Ok(ForwardDecision::Forward(OutputRecord::new(
                event.key.clone(),
                event.value.clone(),
            )));
        }
        Ok(ForwardDecision::Drop)
    }
}
