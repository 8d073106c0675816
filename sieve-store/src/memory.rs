//! In-memory fact store with deterministic fault injection.
//!
//! `MemoryFactStore` stands in for the external durable engine in tests
//! and local runs. Clones share state via `Arc`, so a partition that is
//! revoked and later reassigned observes the same records, matching the
//! reassignment contract of the real engine (within one process).

#![allow(clippy::significant_drop_tightening)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sieve_core::{FactRecord, PartitionId, Timestamp};

use crate::error::{StoreError, StoreResult};
use crate::store::FactStore;

/// Simulated latency reported by injected timeouts.
const INJECTED_TIMEOUT_MS: u64 = 5_000;

/// Fault configuration for the in-memory fact store.
#[derive(Debug, Clone, Default)]
pub struct FaultConfig {
    /// Probability of get operations failing (0.0 - 1.0).
    pub get_fail_rate: f64,
    /// Probability of put operations failing (0.0 - 1.0).
    pub put_fail_rate: f64,
    /// Probability of delete operations failing (0.0 - 1.0).
    pub delete_fail_rate: f64,
    /// Probability of any operation timing out (0.0 - 1.0).
    pub timeout_rate: f64,
    /// Force next get to fail (one-shot).
    pub force_get_fail: bool,
    /// Force next put to fail (one-shot).
    pub force_put_fail: bool,
    /// Force next delete to fail (one-shot).
    pub force_delete_fail: bool,
}

impl FaultConfig {
    /// No faults (all operations succeed).
    #[must_use]
    pub const fn none() -> Self {
        Self {
            get_fail_rate: 0.0,
            put_fail_rate: 0.0,
            delete_fail_rate: 0.0,
            timeout_rate: 0.0,
            force_get_fail: false,
            force_put_fail: false,
            force_delete_fail: false,
        }
    }

    /// Flaky configuration for stress testing.
    #[must_use]
    pub const fn flaky() -> Self {
        Self {
            get_fail_rate: 0.05,
            put_fail_rate: 0.05,
            delete_fail_rate: 0.02,
            timeout_rate: 0.01,
            force_get_fail: false,
            force_put_fail: false,
            force_delete_fail: false,
        }
    }

    /// Builder: set get fail rate.
    #[must_use]
    pub const fn with_get_fail_rate(mut self, rate: f64) -> Self {
        self.get_fail_rate = rate;
        self
    }

    /// Builder: set put fail rate.
    #[must_use]
    pub const fn with_put_fail_rate(mut self, rate: f64) -> Self {
        self.put_fail_rate = rate;
        self
    }

    /// Builder: set delete fail rate.
    #[must_use]
    pub const fn with_delete_fail_rate(mut self, rate: f64) -> Self {
        self.delete_fail_rate = rate;
        self
    }

    /// Builder: set timeout rate.
    #[must_use]
    pub const fn with_timeout_rate(mut self, rate: f64) -> Self {
        self.timeout_rate = rate;
        self
    }
}

/// Per-partition key space: key -> fact record.
type PartitionFacts = HashMap<String, FactRecord>;

/// Shared state behind all handles of one store.
#[derive(Debug, Default)]
struct Shared {
    /// Facts by partition.
    partitions: Mutex<HashMap<PartitionId, PartitionFacts>>,
    /// Fault configuration.
    fault_config: Mutex<FaultConfig>,
    /// Operation counter for deterministic RNG.
    counter: AtomicU64,
}

/// In-memory fact store.
///
/// Clones share state via `Arc` for multi-handle use. Supports
/// deterministic fault injection for testing error paths.
#[derive(Debug, Clone)]
pub struct MemoryFactStore {
    shared: Arc<Shared>,
    /// RNG seed for deterministic faults.
    seed: u64,
}

impl MemoryFactStore {
    /// Creates a new store with no faults.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            seed,
        }
    }

    /// Creates a store with fault injection.
    #[must_use]
    pub fn with_faults(seed: u64, config: FaultConfig) -> Self {
        let store = Self::new(seed);
        *store.shared.fault_config.lock().expect("fault config lock poisoned") = config;
        store
    }

    /// Returns the fault config for modification.
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn fault_config(&self) -> std::sync::MutexGuard<'_, FaultConfig> {
        self.shared
            .fault_config
            .lock()
            .expect("fault config lock poisoned")
    }

    /// Acquires a handle scoped to one partition's key space.
    ///
    /// The handle is acquired when the partition is assigned and dropped
    /// when it is revoked; the underlying facts outlive the handle.
    #[must_use]
    pub fn acquire(&self, partition_id: PartitionId) -> PartitionStore {
        PartitionStore {
            shared: Arc::clone(&self.shared),
            seed: self.seed,
            partition_id,
        }
    }

    /// Returns the record for a key (bypasses faults, for assertions in tests).
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    #[must_use]
    pub fn record(&self, partition_id: PartitionId, key: &str) -> Option<FactRecord> {
        let partitions = self.shared.partitions.lock().expect("partitions lock poisoned");
        partitions.get(&partition_id).and_then(|facts| facts.get(key).cloned())
    }

    /// Returns the number of records in a partition (bypasses faults).
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    #[must_use]
    pub fn fact_count(&self, partition_id: PartitionId) -> usize {
        let partitions = self.shared.partitions.lock().expect("partitions lock poisoned");
        partitions.get(&partition_id).map_or(0, HashMap::len)
    }
}

/// Partition-scoped handle into a [`MemoryFactStore`].
///
/// Implements [`FactStore`]; all operations address the handle's partition.
#[derive(Debug, Clone)]
pub struct PartitionStore {
    shared: Arc<Shared>,
    seed: u64,
    partition_id: PartitionId,
}

impl PartitionStore {
    /// Returns the partition this handle is scoped to.
    #[must_use]
    pub const fn partition_id(&self) -> PartitionId {
        self.partition_id
    }

    /// Deterministic RNG: uses a `(seed + counter) * M` formula so fault
    /// injection is reproducible across runs with the same seed.
    fn should_inject_fault(&self, rate: f64) -> bool {
        if rate <= 0.0 {
            return false;
        }
        if rate >= 1.0 {
            return true;
        }
        let counter = self.shared.counter.fetch_add(1, Ordering::Relaxed);
        let hash = self
            .seed
            .wrapping_add(counter)
            .wrapping_mul(0x9e37_79b9_7f4a_7c15);
        #[allow(clippy::cast_precision_loss)]
        let normalized = (hash as f64) / (u64::MAX as f64);
        normalized < rate
    }

    /// Checks forced and probabilistic faults for one operation.
    fn check_faults(
        &self,
        operation: &'static str,
        force: impl FnOnce(&mut FaultConfig) -> bool,
        rate: impl FnOnce(&FaultConfig) -> f64,
    ) -> StoreResult<()> {
        let (forced, fail_rate, timeout_rate) = {
            let mut config = self
                .shared
                .fault_config
                .lock()
                .expect("fault config lock poisoned");
            (force(&mut config), rate(&config), config.timeout_rate)
        };

        if forced {
            return Err(StoreError::Io {
                operation,
                message: "simulated failure (forced)".to_string(),
            });
        }
        if self.should_inject_fault(timeout_rate) {
            return Err(StoreError::Timeout {
                operation,
                waited_ms: INJECTED_TIMEOUT_MS,
            });
        }
        if self.should_inject_fault(fail_rate) {
            return Err(StoreError::Io {
                operation,
                message: "simulated failure (random)".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl FactStore for PartitionStore {
    async fn get(&self, key: &str) -> StoreResult<Option<FactRecord>> {
        self.check_faults(
            "get",
            |config| std::mem::take(&mut config.force_get_fail),
            |config| config.get_fail_rate,
        )?;

        let partitions = self.shared.partitions.lock().expect("partitions lock poisoned");
        Ok(partitions
            .get(&self.partition_id)
            .and_then(|facts| facts.get(key).cloned()))
    }

    async fn put_if_absent(
        &self,
        key: &str,
        value: &str,
        timestamp: Timestamp,
    ) -> StoreResult<Option<FactRecord>> {
        self.check_faults(
            "put_if_absent",
            |config| std::mem::take(&mut config.force_put_fail),
            |config| config.put_fail_rate,
        )?;

        let mut partitions = self.shared.partitions.lock().expect("partitions lock poisoned");
        let facts = partitions.entry(self.partition_id).or_default();

        if let Some(existing) = facts.get(key) {
            return Ok(Some(existing.clone()));
        }

        facts.insert(key.to_string(), FactRecord::new(value, timestamp));

        // TigerStyle: Assert postcondition.
        assert!(facts.contains_key(key));
        Ok(None)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.check_faults(
            "delete",
            |config| std::mem::take(&mut config.force_delete_fail),
            |config| config.delete_fail_rate,
        )?;

        let mut partitions = self.shared.partitions.lock().expect("partitions lock poisoned");
        if let Some(facts) = partitions.get_mut(&self.partition_id) {
            facts.remove(key);
        }
        Ok(())
    }
}
