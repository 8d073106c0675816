//! Sieve Runtime - partition worker lifecycle and wiring.
//!
//! The runtime bridges the external partition runtime (which assigns
//! partitions and delivers ordered events) and the processing stages.
//! Each assigned partition runs as an independent worker task with its
//! own store handle; workers never share state, so partitions execute
//! fully in parallel while each partition's events are processed strictly
//! sequentially.
//!
//! # Lifecycle
//!
//! 1. `assign`: a partition-scoped store handle is passed in and a worker
//!    task is spawned around it.
//! 2. `deliver`: events are handed to the worker in arrival order; each
//!    reply carries the per-event outcome or the store failure.
//! 3. `revoke`: the worker shuts down and the store handle is released.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod config;
mod error;
mod router;
mod runtime;
mod worker;

pub use config::{ConfigError, RuntimeConfig};
pub use error::{RuntimeError, WorkerError};
pub use router::KeyRouter;
pub use runtime::PartitionRuntime;
pub use worker::{spawn_partition_worker, Delivery, PartitionWorkerHandle, WorkerCommand};
