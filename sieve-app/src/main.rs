//! Sieve demo binary.
//!
//! Drives a synthetic add/expire workload through the dedupe/expiry
//! pipeline and prints forwarded records to stdout, one `key: value`
//! line per first-seen add event.
//!
//! # Bounded run
//!
//! ```bash
//! sieve-app --partitions 2 --rate 100 --events 1000
//! ```
//!
//! # Continuous run with tombstones and an output filter
//!
//! ```bash
//! sieve-app --tombstone-ratio 0.2 --key-prefix ab --grace-ms 60000
//! ```
//!
//! Stop a continuous run with Ctrl-C; all partitions are revoked on the
//! way out.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use sieve_core::Timestamp;
use sieve_runtime::{KeyRouter, PartitionRuntime, RuntimeConfig};
use sieve_store::MemoryFactStore;
use sieve_workload::{Generator, GeneratorConfig, TokenBucket, TokenBucketConfig};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Sieve demo: synthetic load through the dedupe/expiry pipeline.
#[derive(Parser, Debug)]
#[command(name = "sieve-app")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of partitions to assign.
    #[arg(long, default_value = "2")]
    partitions: u32,

    /// Grace window in milliseconds for honoring expire events.
    #[arg(long, default_value = "30000")]
    grace_ms: u64,

    /// Only emit output records whose key starts with this prefix.
    #[arg(long)]
    key_prefix: Option<String>,

    /// Target event rate per second.
    #[arg(long, default_value = "100")]
    rate: u64,

    /// Stop after generating this many events. Runs until Ctrl-C if not set.
    #[arg(long)]
    events: Option<u64>,

    /// Share of generated events that are tombstones (0.0 - 1.0).
    #[arg(long, default_value = "0.1")]
    tombstone_ratio: f64,

    /// Seed for deterministic workload generation.
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: Level,
}

/// Current time in microseconds since the Unix epoch, for the rate limiter.
#[allow(clippy::cast_possible_truncation)] // Fits u64 for centuries.
fn now_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as u64
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logging goes to stderr; stdout carries only the output records.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(
        partitions = args.partitions,
        grace_ms = args.grace_ms,
        rate = args.rate,
        tombstone_ratio = args.tombstone_ratio,
        seed = args.seed,
        "Starting sieve demo"
    );

    let mut config = RuntimeConfig::new().with_grace(Duration::from_millis(args.grace_ms));
    if let Some(prefix) = &args.key_prefix {
        config = config.with_key_prefix(prefix.clone());
    }

    let store = MemoryFactStore::new(args.seed);
    let router = KeyRouter::new(args.partitions);
    let (mut runtime, mut output_rx) = PartitionRuntime::new(config)?;

    for partition in router.partitions() {
        runtime.assign(partition, store.acquire(partition))?;
    }

    // Sink: print forwarded records, count them for the final summary.
    let sink = tokio::spawn(async move {
        let mut forwarded: u64 = 0;
        while let Some(record) = output_rx.recv().await {
            println!("{}: {}", record.key, record.value);
            forwarded += 1;
        }
        forwarded
    });

    let mut generator = Generator::new(
        GeneratorConfig::new(args.seed).with_tombstone_ratio(args.tombstone_ratio),
    );
    let bucket_config = TokenBucketConfig::per_second(args.rate).with_initial_tokens(0);
    let mut bucket = TokenBucket::new(&bucket_config, now_us());

    let produce = async {
        loop {
            if let Some(limit) = args.events {
                if generator.produced() >= limit {
                    break;
                }
            }

            if !bucket.try_consume(1, now_us()) {
                let wait_us = bucket.wait_time_us(1);
                tokio::time::sleep(Duration::from_micros(wait_us)).await;
                continue;
            }

            let event = generator.next_event(Timestamp::now());
            let partition = router.partition_for(event.key());
            if let Err(error) = runtime.deliver(partition, event).await {
                warn!(%error, "event delivery failed");
            }
        }
    };

    tokio::select! {
        () = produce => {
            info!("Event limit reached");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!(events = generator.produced(), "Generator stopped");
    runtime.shutdown().await;

    let forwarded = sink.await.unwrap_or(0);
    info!(forwarded, "Sink drained, exiting");

    Ok(())
}
