//! Runtime configuration.
//!
//! All tunables of the processing core are externalized here; nothing is
//! hard-coded in the stages or workers.

use std::time::Duration;

use sieve_core::Limits;

/// Default grace window: 30 seconds.
const GRACE_DEFAULT: Duration = Duration::from_millis(30_000);

/// Configuration for the partition runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Grace window after a record's creation during which an expire
    /// event is honored.
    pub grace: Duration,
    /// Optional output key-prefix filter, applied after the dedupe
    /// decision to reduce output volume.
    pub key_prefix: Option<String>,
    /// Command channel buffer size per partition worker.
    pub worker_queue_depth: usize,
    /// Output sink channel buffer size, shared by all workers.
    pub output_buffer_size: usize,
    /// System limits.
    pub limits: Limits,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            grace: GRACE_DEFAULT,
            key_prefix: None,
            worker_queue_depth: 1024,
            output_buffer_size: 1024,
            limits: Limits::new(),
        }
    }
}

impl RuntimeConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the grace window.
    #[must_use]
    pub const fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Sets the output key-prefix filter.
    #[must_use]
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Sets the per-worker command queue depth.
    #[must_use]
    pub const fn with_worker_queue_depth(mut self, depth: usize) -> Self {
        self.worker_queue_depth = depth;
        self
    }

    /// Sets the output sink buffer size.
    #[must_use]
    pub const fn with_output_buffer_size(mut self, size: usize) -> Self {
        self.output_buffer_size = size;
        self
    }

    /// Returns the grace window in milliseconds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // Grace windows are far below u64::MAX ms.
    pub const fn grace_ms(&self) -> u64 {
        self.grace.as_millis() as u64
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_queue_depth == 0 {
            return Err(ConfigError::InvalidBuffer {
                message: "worker_queue_depth must be > 0".to_string(),
            });
        }
        if self.worker_queue_depth > self.limits.worker_queue_depth_max as usize {
            return Err(ConfigError::InvalidBuffer {
                message: format!(
                    "worker_queue_depth {} exceeds limit {}",
                    self.worker_queue_depth, self.limits.worker_queue_depth_max
                ),
            });
        }
        if self.output_buffer_size == 0 {
            return Err(ConfigError::InvalidBuffer {
                message: "output_buffer_size must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid channel buffer configuration.
    InvalidBuffer {
        /// Error description.
        message: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBuffer { message } => write!(f, "invalid buffer: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}
