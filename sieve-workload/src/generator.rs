//! Deterministic event generation.
//!
//! Generates add events with random hex keys large enough to make
//! collisions vanishingly rare, plus an optional share of expire events
//! targeting recently generated keys so both stages see traffic. The
//! generator is seeded and pure: the same seed yields the same event
//! sequence.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sieve_core::{AddEvent, Event, ExpireEvent, Timestamp};

/// Configuration for the event generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Random seed for deterministic generation.
    pub seed: u64,
    /// Raw key size in bytes (hex-encoded to twice as many characters).
    pub key_bytes: usize,
    /// Raw value size in bytes (hex-encoded to twice as many characters).
    pub value_bytes: usize,
    /// Share of generated events that are tombstones (0.0 - 1.0).
    /// Tombstones target recently generated keys.
    pub tombstone_ratio: f64,
    /// Maximum number of recent keys retained as tombstone targets.
    pub recent_keys_max: usize,
}

impl GeneratorConfig {
    /// Creates a configuration with defaults matching the demo workload:
    /// 256-byte keys (very few collisions), 32-byte values, adds only.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            key_bytes: 256,
            value_bytes: 32,
            tombstone_ratio: 0.0,
            recent_keys_max: 1024,
        }
    }

    /// Sets the raw key size in bytes.
    #[must_use]
    pub const fn with_key_bytes(mut self, key_bytes: usize) -> Self {
        self.key_bytes = key_bytes;
        self
    }

    /// Sets the raw value size in bytes.
    #[must_use]
    pub const fn with_value_bytes(mut self, value_bytes: usize) -> Self {
        self.value_bytes = value_bytes;
        self
    }

    /// Sets the tombstone share.
    #[must_use]
    pub const fn with_tombstone_ratio(mut self, ratio: f64) -> Self {
        self.tombstone_ratio = ratio;
        self
    }
}

/// Deterministic add/expire event generator.
#[derive(Debug)]
pub struct Generator {
    /// Configuration.
    config: GeneratorConfig,
    /// Seeded RNG.
    rng: ChaCha8Rng,
    /// Recently generated keys, candidates for tombstones.
    recent_keys: VecDeque<String>,
    /// Total events produced.
    produced: u64,
}

impl Generator {
    /// Creates a generator from a configuration.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            rng,
            recent_keys: VecDeque::new(),
            produced: 0,
        }
    }

    /// Returns the total number of events produced.
    #[must_use]
    pub const fn produced(&self) -> u64 {
        self.produced
    }

    /// Generates the next event, stamped with `event_time`.
    ///
    /// Emits a tombstone for a recently generated key with probability
    /// `tombstone_ratio` (once at least one add has been produced),
    /// otherwise a fresh add event.
    pub fn next_event(&mut self, event_time: Timestamp) -> Event {
        self.produced += 1;

        if !self.recent_keys.is_empty()
            && self.config.tombstone_ratio > 0.0
            && self.rng.gen::<f64>() < self.config.tombstone_ratio
        {
            let idx = self.rng.gen_range(0..self.recent_keys.len());
            let key = self
                .recent_keys
                .swap_remove_back(idx)
                .unwrap_or_default();
            return Event::Expire(ExpireEvent::new(key, event_time));
        }

        let key = self.random_hex(self.config.key_bytes);
        let value = self.random_hex(self.config.value_bytes);

        self.recent_keys.push_back(key.clone());
        if self.recent_keys.len() > self.config.recent_keys_max {
            self.recent_keys.pop_front();
        }

        Event::Add(AddEvent::new(key, value, event_time))
    }

    /// Produces a random hex string of `2 * bytes` characters.
    fn random_hex(&mut self, bytes: usize) -> String {
        use std::fmt::Write;

        let mut out = String::with_capacity(bytes * 2);
        for _ in 0..bytes {
            let byte: u8 = self.rng.gen();
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}
