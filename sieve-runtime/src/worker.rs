//! Partition worker for lock-free multi-partition processing.
//!
//! Each assigned partition runs as an independent worker task owning the
//! partition-scoped store handle and both stages. Commands are processed
//! strictly sequentially off one channel, which is the single-writer
//! guarantee the fact store's `put_if_absent` relies on.
//!
//! # Message Flow
//!
//! 1. `Deliver`: the runtime hands the worker the next event of the
//!    partition's merged add/expire sequence; the reply channel carries
//!    the per-event outcome or the store failure.
//! 2. `Shutdown`: graceful stop on partition revocation; the store handle
//!    is dropped with the worker.

use sieve_core::{Event, OutputRecord, PartitionId, Timestamp};
use sieve_stage::{DedupeStage, ExpiryOutcome, ExpiryStage, ForwardDecision, KeyPrefixFilter};
use sieve_store::FactStore;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, instrument, warn};

use crate::config::RuntimeConfig;
use crate::error::WorkerError;

/// Commands sent to a partition worker.
#[derive(Debug)]
pub enum WorkerCommand {
    /// Process the next event of the partition's sequence.
    Deliver {
        /// The event to process.
        event: Event,
        /// Channel to receive the outcome.
        reply: oneshot::Sender<Result<Delivery, WorkerError>>,
    },

    /// Graceful shutdown on partition revocation.
    Shutdown,
}

/// Outcome of delivering one event to a partition worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Add event was first-seen and forwarded to the output sink.
    Forwarded,
    /// Add event was a duplicate and dropped.
    Duplicate,
    /// Add event was first-seen but suppressed by the output filter.
    /// The key is still marked as seen.
    Filtered,
    /// Expire event removed the stored record.
    Removed,
    /// Expire event found a record past its grace window; left in place.
    Retained,
    /// Expire event found no stored record.
    Absent,
}

/// Handle for sending commands to a partition worker.
#[derive(Debug, Clone)]
pub struct PartitionWorkerHandle {
    /// Channel to send commands.
    tx: mpsc::Sender<WorkerCommand>,
    /// The partition this handle is for.
    partition_id: PartitionId,
}

impl PartitionWorkerHandle {
    /// Creates a new handle.
    #[must_use]
    pub const fn new(tx: mpsc::Sender<WorkerCommand>, partition_id: PartitionId) -> Self {
        Self { tx, partition_id }
    }

    /// Returns the partition this handle is for.
    #[must_use]
    pub const fn partition_id(&self) -> PartitionId {
        self.partition_id
    }

    /// Delivers one event and waits for its outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The worker has shut down
    /// - A stage failed to process the event (store failure)
    pub async fn deliver(&self, event: Event) -> Result<Delivery, WorkerError> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.tx
            .send(WorkerCommand::Deliver {
                event,
                reply: reply_tx,
            })
            .await
            .map_err(|_| WorkerError::WorkerShutdown)?;

        reply_rx.await.map_err(|_| WorkerError::WorkerShutdown)?
    }

    /// Shuts down the partition worker.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker has already shut down.
    pub async fn shutdown(&self) -> Result<(), WorkerError> {
        self.tx
            .send(WorkerCommand::Shutdown)
            .await
            .map_err(|_| WorkerError::WorkerShutdown)
    }
}

/// Spawns a partition worker and returns a handle to communicate with it.
///
/// The worker runs in its own tokio task and processes commands
/// sequentially. Both stages share the given partition-scoped store
/// handle; it is released when the worker stops.
///
/// Forwarded output records are sent to `output_tx`, which may be shared
/// by all partition workers.
#[must_use]
pub fn spawn_partition_worker<S>(
    partition_id: PartitionId,
    store: S,
    config: &RuntimeConfig,
    output_tx: mpsc::Sender<OutputRecord>,
) -> PartitionWorkerHandle
where
    S: FactStore + Clone + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel(config.worker_queue_depth);

    let worker = PartitionWorker {
        partition_id,
        dedupe: DedupeStage::new(store.clone()),
        expiry: ExpiryStage::new(store, config.grace_ms()),
        filter: config.key_prefix.clone().map(KeyPrefixFilter::new),
        cmd_rx,
        output_tx,
    };

    tokio::spawn(worker.run());

    PartitionWorkerHandle::new(cmd_tx, partition_id)
}

/// The partition worker state.
struct PartitionWorker<S> {
    /// The partition ID.
    partition_id: PartitionId,
    /// Dedupe stage over the partition's store handle.
    dedupe: DedupeStage<S>,
    /// Expiry stage over the same store handle.
    expiry: ExpiryStage<S>,
    /// Optional output filter, applied after the dedupe decision.
    filter: Option<KeyPrefixFilter>,
    /// Inbound command channel.
    cmd_rx: mpsc::Receiver<WorkerCommand>,
    /// Output sink for forwarded records.
    output_tx: mpsc::Sender<OutputRecord>,
}

impl<S: FactStore> PartitionWorker<S> {
    /// Runs the worker message loop.
    #[instrument(skip(self), fields(partition = self.partition_id.get()))]
    async fn run(mut self) {
        info!("Partition worker started");

        while let Some(cmd) = self.cmd_rx.recv().await {
            match cmd {
                WorkerCommand::Deliver { event, reply } => {
                    let result = self.handle_event(&event).await;
                    if let Err(error) = &result {
                        warn!(%error, key = event.key(), "event processing failed");
                    }
                    let _ = reply.send(result);
                }
                WorkerCommand::Shutdown => {
                    info!("Partition worker shutting down");
                    break;
                }
            }
        }

        info!("Partition worker stopped");
    }

    /// Processes one event through the matching stage.
    async fn handle_event(&self, event: &Event) -> Result<Delivery, WorkerError> {
        match event {
            Event::Add(add) => {
                match self.dedupe.process(add, Timestamp::now()).await? {
                    ForwardDecision::Forward(record) => {
                        // The filter only reduces output volume; the key
                        // was already marked as seen above.
                        if let Some(filter) = &self.filter {
                            if !filter.accept(&record) {
                                return Ok(Delivery::Filtered);
                            }
                        }
                        if self.output_tx.send(record).await.is_err() {
                            warn!("output sink closed; forwarded record dropped");
                        }
                        Ok(Delivery::Forwarded)
                    }
                    ForwardDecision::Drop => Ok(Delivery::Duplicate),
                }
            }
            Event::Expire(expire) => Ok(match self.expiry.process(expire).await? {
                ExpiryOutcome::Removed => Delivery::Removed,
                ExpiryOutcome::Retained => Delivery::Retained,
                ExpiryOutcome::Absent => Delivery::Absent,
            }),
        }
    }
}
