//! System limits and configuration bounds.
//!
//! Following TigerStyle: put limits on everything.
//! Every key, value, and channel has an explicit maximum size.

/// System-wide limits for Sieve.
///
/// All limits are explicit and configurable. Default values are chosen
/// to be safe for most deployments while allowing customization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum size of an event key in bytes.
    pub key_bytes_max: u32,
    /// Maximum size of an event value in bytes.
    pub value_bytes_max: u32,
    /// Maximum number of partitions.
    pub partitions_max: u32,
    /// Maximum number of buffered commands per partition worker.
    pub worker_queue_depth_max: u32,
}

impl Limits {
    /// Creates limits with safe defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            // Keys: generated keys are 512 hex chars; leave headroom.
            key_bytes_max: 4 * 1024,
            // Values: 1MB, matching common broker message limits.
            value_bytes_max: 1024 * 1024,
            // Partitions: bounded so routing tables stay small.
            partitions_max: 4096,
            // Worker queues: bounded to apply backpressure upstream.
            worker_queue_depth_max: 64 * 1024,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let limits = Limits::new();
        assert!(limits.key_bytes_max > 0);
        assert!(limits.value_bytes_max >= limits.key_bytes_max);
        assert!(limits.partitions_max > 0);
        assert!(limits.worker_queue_depth_max > 0);
    }

    #[test]
    fn test_default_matches_new() {
        assert_eq!(Limits::default(), Limits::new());
    }
}
