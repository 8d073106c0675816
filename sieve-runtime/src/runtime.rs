//! Partition runtime: assignment, delivery, and revocation.
//!
//! Thin ownership layer over the per-partition workers. The external
//! runtime (which decides which partitions this process handles) calls
//! `assign` with a partition-scoped store handle, routes each partition's
//! events through `deliver`, and calls `revoke` when the partition moves
//! away. Forwarded output records from all workers arrive on one shared
//! sink channel.

use std::collections::HashMap;

use sieve_core::{Event, OutputRecord, PartitionId};
use sieve_store::FactStore;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::RuntimeConfig;
use crate::error::RuntimeError;
use crate::worker::{spawn_partition_worker, Delivery, PartitionWorkerHandle};

/// Manages one worker per assigned partition.
#[derive(Debug)]
pub struct PartitionRuntime {
    /// Configuration shared by all workers.
    config: RuntimeConfig,
    /// Workers by partition.
    workers: HashMap<PartitionId, PartitionWorkerHandle>,
    /// Shared output sink all workers forward into.
    output_tx: mpsc::Sender<OutputRecord>,
}

impl PartitionRuntime {
    /// Creates a runtime and the output sink receiver.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(
        config: RuntimeConfig,
    ) -> Result<(Self, mpsc::Receiver<OutputRecord>), RuntimeError> {
        config.validate()?;

        let (output_tx, output_rx) = mpsc::channel(config.output_buffer_size);
        Ok((
            Self {
                config,
                workers: HashMap::new(),
                output_tx,
            },
            output_rx,
        ))
    }

    /// Returns the runtime configuration.
    #[must_use]
    pub const fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Assigns a partition: spawns a worker around the given
    /// partition-scoped store handle.
    ///
    /// # Errors
    /// Returns an error if the partition is already assigned.
    pub fn assign<S>(&mut self, partition_id: PartitionId, store: S) -> Result<(), RuntimeError>
    where
        S: FactStore + Clone + 'static,
    {
        if self.workers.contains_key(&partition_id) {
            return Err(RuntimeError::AlreadyAssigned {
                partition: partition_id,
            });
        }

        let handle =
            spawn_partition_worker(partition_id, store, &self.config, self.output_tx.clone());
        self.workers.insert(partition_id, handle);

        info!(partition = partition_id.get(), "Partition assigned");
        Ok(())
    }

    /// Revokes a partition: shuts its worker down and releases the store
    /// handle.
    ///
    /// # Errors
    /// Returns an error if the partition is not assigned.
    pub async fn revoke(&mut self, partition_id: PartitionId) -> Result<(), RuntimeError> {
        let handle = self
            .workers
            .remove(&partition_id)
            .ok_or(RuntimeError::NotAssigned {
                partition: partition_id,
            })?;

        // A worker that already stopped on its own still counts as revoked.
        let _ = handle.shutdown().await;

        info!(partition = partition_id.get(), "Partition revoked");
        Ok(())
    }

    /// Delivers one event to its partition's worker and waits for the
    /// outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the partition is not assigned, the worker has
    /// shut down, or a stage failed to process the event.
    pub async fn deliver(
        &self,
        partition_id: PartitionId,
        event: Event,
    ) -> Result<Delivery, RuntimeError> {
        let handle = self
            .workers
            .get(&partition_id)
            .ok_or(RuntimeError::NotAssigned {
                partition: partition_id,
            })?;

        Ok(handle.deliver(event).await?)
    }

    /// Returns the currently assigned partitions, sorted.
    #[must_use]
    pub fn assignments(&self) -> Vec<PartitionId> {
        let mut partitions: Vec<_> = self.workers.keys().copied().collect();
        partitions.sort_unstable();
        partitions
    }

    /// Revokes all partitions and shuts the runtime down.
    pub async fn shutdown(mut self) {
        for partition_id in self.assignments() {
            let _ = self.revoke(partition_id).await;
        }
        info!("Partition runtime stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_core::{AddEvent, Timestamp};
    use sieve_store::MemoryFactStore;

    const P0: PartitionId = PartitionId::new(0);
    const P1: PartitionId = PartitionId::new(1);

    fn add(key: &str, value: &str) -> Event {
        Event::Add(AddEvent::new(key, value, Timestamp::now()))
    }

    #[tokio::test]
    async fn test_assign_deliver_revoke() {
        let store = MemoryFactStore::new(42);
        let (mut runtime, mut output_rx) = PartitionRuntime::new(RuntimeConfig::new()).unwrap();

        runtime.assign(P0, store.acquire(P0)).unwrap();
        assert_eq!(runtime.assignments(), vec![P0]);

        let outcome = runtime.deliver(P0, add("a", "foo")).await.unwrap();
        assert_eq!(outcome, Delivery::Forwarded);
        assert_eq!(output_rx.recv().await.unwrap(), OutputRecord::new("a", "foo"));

        runtime.revoke(P0).await.unwrap();
        assert!(runtime.assignments().is_empty());
    }

    #[tokio::test]
    async fn test_double_assign_is_rejected() {
        let store = MemoryFactStore::new(42);
        let (mut runtime, _output_rx) = PartitionRuntime::new(RuntimeConfig::new()).unwrap();

        runtime.assign(P0, store.acquire(P0)).unwrap();
        let result = runtime.assign(P0, store.acquire(P0));
        assert!(matches!(result, Err(RuntimeError::AlreadyAssigned { .. })));
    }

    #[tokio::test]
    async fn test_deliver_to_unassigned_partition() {
        let (runtime, _output_rx) = PartitionRuntime::new(RuntimeConfig::new()).unwrap();
        let result = runtime.deliver(P0, add("a", "foo")).await;
        assert!(matches!(result, Err(RuntimeError::NotAssigned { .. })));
    }

    #[tokio::test]
    async fn test_revoke_unassigned_partition() {
        let (mut runtime, _output_rx) = PartitionRuntime::new(RuntimeConfig::new()).unwrap();
        let result = runtime.revoke(P0).await;
        assert!(matches!(result, Err(RuntimeError::NotAssigned { .. })));
    }

    #[tokio::test]
    async fn test_partitions_run_independently() {
        let store = MemoryFactStore::new(42);
        let (mut runtime, _output_rx) = PartitionRuntime::new(RuntimeConfig::new()).unwrap();

        runtime.assign(P0, store.acquire(P0)).unwrap();
        runtime.assign(P1, store.acquire(P1)).unwrap();

        // The same key is first-seen in each partition's own store shard.
        assert_eq!(
            runtime.deliver(P0, add("k", "v")).await.unwrap(),
            Delivery::Forwarded
        );
        assert_eq!(
            runtime.deliver(P1, add("k", "v")).await.unwrap(),
            Delivery::Forwarded
        );

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let config = RuntimeConfig::new().with_worker_queue_depth(0);
        assert!(PartitionRuntime::new(config).is_err());
    }
}
