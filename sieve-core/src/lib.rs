//! Sieve Core - Strongly-typed identifiers and the event data model.
//!
//! This crate provides the types shared by every Sieve crate: partition
//! identifiers, millisecond timestamps, the add/expire event model, the
//! stored fact record, and explicit limits.
//!
//! # Design Principles (TigerStyle)
//!
//! - **Strongly-typed IDs**: Prevent mixing up a partition with a raw index
//! - **Explicit limits**: Every key and value has a bounded maximum
//! - **Explicit types**: Use u32/u64/i64, not usize
//! - **No unsafe code**: Safety > Performance

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod event;
mod limits;
mod types;

pub use event::{AddEvent, Event, EventError, ExpireEvent, FactRecord, OutputRecord};
pub use limits::Limits;
pub use types::{PartitionId, Timestamp};
