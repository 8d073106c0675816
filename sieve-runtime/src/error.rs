//! Runtime error types.

use sieve_core::PartitionId;
use sieve_stage::StageError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors from partition worker operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// The worker task has shut down.
    #[error("partition worker has shut down")]
    WorkerShutdown,

    /// A stage failed to process the event.
    #[error(transparent)]
    Stage(#[from] StageError),
}

/// Errors from partition runtime operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The partition is already assigned to a worker.
    #[error("{partition} is already assigned")]
    AlreadyAssigned {
        /// The partition.
        partition: PartitionId,
    },

    /// The partition is not assigned to any worker.
    #[error("{partition} is not assigned")]
    NotAssigned {
        /// The partition.
        partition: PartitionId,
    },

    /// A worker operation failed.
    #[error(transparent)]
    Worker(#[from] WorkerError),

    /// The runtime configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
