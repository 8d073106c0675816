//! Key-to-partition routing.
//!
//! Each key maps deterministically to exactly one partition. The fact
//! store and the event stream must be sharded by the same routing, which
//! is what makes single-threaded-per-partition processing sufficient for
//! correctness: no key can collide across partitions.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use sieve_core::PartitionId;

/// Deterministic key router over a fixed partition count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRouter {
    /// Number of partitions keys are sharded into.
    partition_count: u32,
}

impl KeyRouter {
    /// Creates a router over `partition_count` partitions.
    ///
    /// # Panics
    ///
    /// Panics if `partition_count` is zero.
    #[must_use]
    pub fn new(partition_count: u32) -> Self {
        assert!(partition_count > 0, "partition_count must be > 0");
        Self { partition_count }
    }

    /// Returns the partition count.
    #[must_use]
    pub const fn partition_count(&self) -> u32 {
        self.partition_count
    }

    /// Returns the partition responsible for `key`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // Reduced modulo partition_count, which is u32.
    pub fn partition_for(&self, key: &str) -> PartitionId {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        PartitionId::new((hasher.finish() % u64::from(self.partition_count)) as u32)
    }

    /// Returns all partition IDs covered by this router.
    pub fn partitions(&self) -> impl Iterator<Item = PartitionId> {
        (0..self.partition_count).map(PartitionId::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_is_deterministic() {
        let router = KeyRouter::new(8);
        assert_eq!(router.partition_for("abc"), router.partition_for("abc"));
    }

    #[test]
    fn test_routing_is_in_range() {
        let router = KeyRouter::new(4);
        for i in 0..1000 {
            let partition = router.partition_for(&format!("key-{i}"));
            assert!(partition.get() < 4);
        }
    }

    #[test]
    fn test_single_partition_takes_everything() {
        let router = KeyRouter::new(1);
        assert_eq!(router.partition_for("x"), PartitionId::new(0));
        assert_eq!(router.partition_for("y"), PartitionId::new(0));
    }

    #[test]
    fn test_keys_spread_across_partitions() {
        let router = KeyRouter::new(4);
        let mut seen = std::collections::HashSet::new();
        for i in 0..1000 {
            seen.insert(router.partition_for(&format!("key-{i}")));
        }
        // With 1000 distinct keys, all 4 partitions should be hit.
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_partitions_iterator() {
        let router = KeyRouter::new(3);
        let all: Vec<_> = router.partitions().collect();
        assert_eq!(
            all,
            vec![PartitionId::new(0), PartitionId::new(1), PartitionId::new(2)]
        );
    }

    #[test]
    #[should_panic(expected = "partition_count must be > 0")]
    fn test_zero_partitions_panics() {
        let _ = KeyRouter::new(0);
    }
}
