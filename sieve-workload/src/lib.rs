//! Sieve Workload - synthetic load generation.
//!
//! Provides a deterministic event generator (random hex keys and values,
//! with an optional share of tombstones against recently generated keys)
//! and a token-bucket rate limiter for pacing it. Both take the current
//! time as an explicit parameter so tests stay deterministic.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod generator;
mod limiter;

pub use generator::{Generator, GeneratorConfig};
pub use limiter::{TokenBucket, TokenBucketConfig};
