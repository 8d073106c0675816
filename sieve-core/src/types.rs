//! Strongly-typed identifiers and time for Sieve entities.
//!
//! Following `TigerStyle`: explicit types prevent bugs from mixing up
//! a partition index with an arbitrary integer, or milliseconds with
//! microseconds.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for a partition (a key-space shard).
///
/// Each key maps deterministically to exactly one partition; the fact
/// store and the event stream are co-partitioned identically.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct PartitionId(u32);

impl PartitionId {
    /// Creates a new partition ID from a raw u32 value.
    #[inline]
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw u32 value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "partition({})", self.0)
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "partition-{}", self.0)
    }
}

impl From<u32> for PartitionId {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<PartitionId> for u32 {
    fn from(id: PartitionId) -> Self {
        id.get()
    }
}

/// Millisecond timestamp since the Unix epoch.
///
/// Carried by every event (`event_time`) and stamped onto every stored
/// fact record at insertion. Event times are compared exactly as
/// received; the core never reorders or reconciles them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from milliseconds since the Unix epoch.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as milliseconds since the Unix epoch.
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Returns the current wall-clock time as a timestamp.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // Timestamps won't overflow i64 for centuries.
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self(duration.as_millis() as i64)
    }

    /// Returns this timestamp advanced by `millis`, saturating at `i64::MAX`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)] // Grace windows are far below i64::MAX ms.
    pub const fn saturating_add_millis(self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis as i64))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_id_display() {
        let partition = PartitionId::new(42);
        assert_eq!(format!("{partition}"), "partition-42");
        assert_eq!(format!("{partition:?}"), "partition(42)");
    }

    #[test]
    fn test_partition_id_conversions() {
        let partition = PartitionId::from(7_u32);
        assert_eq!(u32::from(partition), 7);
    }

    #[test]
    fn test_timestamp_millis() {
        let ts = Timestamp::from_millis(1000);
        assert_eq!(ts.as_millis(), 1000);
    }

    #[test]
    fn test_timestamp_ordering() {
        let a = Timestamp::from_millis(1);
        let b = Timestamp::from_millis(2);
        assert!(a < b);
    }

    #[test]
    fn test_timestamp_saturating_add() {
        let ts = Timestamp::from_millis(100);
        assert_eq!(ts.saturating_add_millis(30_000).as_millis(), 30_100);

        let near_max = Timestamp::from_millis(i64::MAX - 5);
        assert_eq!(near_max.saturating_add_millis(100).as_millis(), i64::MAX);
    }

    #[test]
    fn test_timestamp_now_is_positive() {
        assert!(Timestamp::now().as_millis() > 0);
    }
}
