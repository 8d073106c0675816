//! Event and record types for Sieve.
//!
//! Events are the fundamental unit of input. Upstream delivery splits the
//! raw stream by an event-kind discriminator: a record with a value is an
//! add request, a record with an absent value is an expire (tombstone)
//! request. Both carry an event timestamp.
//!
//! # Key lifecycle
//!
//! A key's presence in the fact store moves through
//! `ABSENT -> (first add) -> PRESENT -> (qualifying expire) -> ABSENT`,
//! repeatable indefinitely.

use std::fmt;

use crate::limits::Limits;
use crate::types::Timestamp;

/// A request to record a key as seen and forward its value downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddEvent {
    /// UTF-8 key.
    pub key: String,
    /// UTF-8 value, forwarded unchanged when the key is first-seen.
    pub value: String,
    /// Event timestamp in milliseconds.
    pub event_time: Timestamp,
}

impl AddEvent {
    /// Creates a new add event.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>, event_time: Timestamp) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            event_time,
        }
    }
}

/// A request to remove a previously recorded key (tombstone).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpireEvent {
    /// UTF-8 key.
    pub key: String,
    /// Event timestamp in milliseconds, compared against the stored
    /// record's creation time.
    pub event_time: Timestamp,
}

impl ExpireEvent {
    /// Creates a new expire event.
    #[must_use]
    pub fn new(key: impl Into<String>, event_time: Timestamp) -> Self {
        Self {
            key: key.into(),
            event_time,
        }
    }
}

/// An input event, already split by kind.
///
/// A tagged variant replaces per-event dynamic dispatch between processor
/// kinds: the partition worker matches on the variant and hands the payload
/// to the corresponding stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Add request (value present).
    Add(AddEvent),
    /// Expire request (value absent).
    Expire(ExpireEvent),
}

impl Event {
    /// Builds an event from its wire parts: an absent value marks an
    /// expire request, a present value an add request.
    #[must_use]
    pub fn from_parts(key: String, value: Option<String>, event_time: Timestamp) -> Self {
        match value {
            Some(value) => Self::Add(AddEvent {
                key,
                value,
                event_time,
            }),
            None => Self::Expire(ExpireEvent { key, event_time }),
        }
    }

    /// Returns the event's key.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Add(add) => &add.key,
            Self::Expire(expire) => &expire.key,
        }
    }

    /// Returns the event timestamp.
    #[must_use]
    pub const fn event_time(&self) -> Timestamp {
        match self {
            Self::Add(add) => add.event_time,
            Self::Expire(expire) => expire.event_time,
        }
    }

    /// Validates the event against limits.
    ///
    /// # Errors
    /// Returns an error if the key or value exceeds its maximum size.
    pub fn validate(&self, limits: &Limits) -> Result<(), EventError> {
        let key = self.key();
        if key.len() > limits.key_bytes_max as usize {
            return Err(EventError::KeyTooLarge {
                size: key.len(),
                max: limits.key_bytes_max as usize,
            });
        }

        if let Self::Add(add) = self {
            if add.value.len() > limits.value_bytes_max as usize {
                return Err(EventError::ValueTooLarge {
                    size: add.value.len(),
                    max: limits.value_bytes_max as usize,
                });
            }
        }

        Ok(())
    }
}

/// A record stored in the fact store: at most one per key at any instant.
///
/// Created only by the dedupe stage (sentinel value, timestamp = the
/// stage's processing time at insertion). Never mutated once created.
/// Destroyed only by the expiry stage, conditionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactRecord {
    /// Stored value (a sentinel marking the key as seen).
    pub value: String,
    /// Creation time in milliseconds.
    pub timestamp: Timestamp,
}

impl FactRecord {
    /// Creates a new fact record.
    #[must_use]
    pub fn new(value: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            value: value.into(),
            timestamp,
        }
    }
}

/// A `(key, value)` pair emitted to the output sink for a first-seen,
/// non-filtered add event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    /// Key of the forwarded add event.
    pub key: String,
    /// Value of the forwarded add event, unchanged.
    pub value: String,
}

impl OutputRecord {
    /// Creates a new output record.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Event validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// Event key exceeds the maximum size.
    KeyTooLarge {
        /// Actual size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },
    /// Event value exceeds the maximum size.
    ValueTooLarge {
        /// Actual size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyTooLarge { size, max } => {
                write!(f, "event key too large: {size} > {max} bytes")
            }
            Self::ValueTooLarge { size, max } => {
                write!(f, "event value too large: {size} > {max} bytes")
            }
        }
    }
}

impl std::error::Error for EventError {}
