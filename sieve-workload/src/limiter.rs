//! Token bucket rate limiter.
//!
//! A token bucket allows controlled bursting while enforcing an average
//! rate limit. Tokens are added to the bucket at a fixed rate, and each
//! produced event consumes one token. The rate can be changed while the
//! bucket is live, which is how a running generator picks up a rate
//! override without being rebuilt.

/// Configuration for a token bucket.
#[derive(Debug, Clone)]
pub struct TokenBucketConfig {
    /// Maximum number of tokens the bucket can hold.
    pub capacity: u64,

    /// Tokens added per second.
    pub refill_rate: u64,

    /// Initial number of tokens (defaults to capacity if not set).
    pub initial_tokens: Option<u64>,
}

impl TokenBucketConfig {
    /// Creates a new token bucket configuration.
    #[must_use]
    pub const fn new(capacity: u64, refill_rate: u64) -> Self {
        Self {
            capacity,
            refill_rate,
            initial_tokens: None,
        }
    }

    /// Sets the initial number of tokens.
    #[must_use]
    pub const fn with_initial_tokens(mut self, tokens: u64) -> Self {
        self.initial_tokens = Some(tokens);
        self
    }

    /// Creates a configuration producing `rate` events per second with a
    /// one-second burst allowance.
    #[must_use]
    pub const fn per_second(rate: u64) -> Self {
        Self::new(rate, rate)
    }
}

/// A token bucket rate limiter.
///
/// Time is injected as microseconds since an arbitrary epoch; the bucket
/// never reads a clock itself.
#[derive(Debug)]
pub struct TokenBucket {
    /// Current number of tokens in the bucket.
    tokens: u64,

    /// Maximum capacity.
    capacity: u64,

    /// Tokens added per second.
    refill_rate: u64,

    /// Last time tokens were refilled (microseconds).
    last_refill_us: u64,
}

impl TokenBucket {
    /// Creates a new token bucket with the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the refill rate is zero.
    #[must_use]
    pub fn new(config: &TokenBucketConfig, current_time_us: u64) -> Self {
        assert!(config.refill_rate > 0, "refill_rate must be > 0");

        let initial = config.initial_tokens.unwrap_or(config.capacity);
        Self {
            tokens: initial.min(config.capacity),
            capacity: config.capacity,
            refill_rate: config.refill_rate,
            last_refill_us: current_time_us,
        }
    }

    /// Returns the current number of available tokens.
    ///
    /// This does NOT perform a refill. Use `refill()` first for an
    /// accurate count.
    #[must_use]
    pub const fn available_tokens(&self) -> u64 {
        self.tokens
    }

    /// Returns the bucket capacity.
    #[must_use]
    pub const fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Returns the refill rate in tokens per second.
    #[must_use]
    pub const fn rate(&self) -> u64 {
        self.refill_rate
    }

    /// Adds tokens accrued since the last refill.
    #[allow(clippy::cast_possible_truncation)] // Bounded by elapsed wall time.
    pub fn refill(&mut self, current_time_us: u64) {
        if current_time_us <= self.last_refill_us {
            return;
        }

        let elapsed_us = current_time_us - self.last_refill_us;
        let added = (u128::from(elapsed_us) * u128::from(self.refill_rate) / 1_000_000) as u64;
        if added == 0 {
            return;
        }

        self.tokens = self.tokens.saturating_add(added).min(self.capacity);
        // Advance only by the time actually converted into tokens, so
        // sub-token remainders keep accruing.
        let consumed_us = (u128::from(added) * 1_000_000 / u128::from(self.refill_rate)) as u64;
        self.last_refill_us += consumed_us;
    }

    /// Consumes `tokens` if available after refilling at `current_time_us`.
    ///
    /// Returns true if the tokens were consumed.
    pub fn try_consume(&mut self, tokens: u64, current_time_us: u64) -> bool {
        self.refill(current_time_us);

        if self.tokens >= tokens {
            self.tokens -= tokens;
            return true;
        }
        false
    }

    /// Returns how long to wait, in microseconds, until `tokens` become
    /// available at the current refill rate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // Deficits are tiny relative to u128.
    pub const fn wait_time_us(&self, tokens: u64) -> u64 {
        if self.tokens >= tokens {
            return 0;
        }
        let deficit = tokens - self.tokens;
        ((deficit as u128 * 1_000_000).div_ceil(self.refill_rate as u128)) as u64
    }

    /// Changes the refill rate, keeping accrued tokens.
    ///
    /// # Panics
    ///
    /// Panics if the new rate is zero.
    pub fn set_rate(&mut self, refill_rate: u64, current_time_us: u64) {
        assert!(refill_rate > 0, "refill_rate must be > 0");

        // Settle accrual under the old rate before switching.
        self.refill(current_time_us);
        self.refill_rate = refill_rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_full_by_default() {
        let bucket = TokenBucket::new(&TokenBucketConfig::new(100, 10), 0);
        assert_eq!(bucket.available_tokens(), 100);
    }

    #[test]
    fn test_initial_tokens_capped_at_capacity() {
        let config = TokenBucketConfig::new(10, 10).with_initial_tokens(50);
        let bucket = TokenBucket::new(&config, 0);
        assert_eq!(bucket.available_tokens(), 10);
    }

    #[test]
    fn test_consume_drains_tokens() {
        let mut bucket = TokenBucket::new(&TokenBucketConfig::new(10, 1), 0);
        assert!(bucket.try_consume(4, 0));
        assert_eq!(bucket.available_tokens(), 6);
    }

    #[test]
    fn test_consume_fails_when_empty() {
        let config = TokenBucketConfig::new(10, 1).with_initial_tokens(0);
        let mut bucket = TokenBucket::new(&config, 0);
        assert!(!bucket.try_consume(1, 0));
    }

    #[test]
    fn test_refill_accrues_over_time() {
        let config = TokenBucketConfig::new(100, 10).with_initial_tokens(0);
        let mut bucket = TokenBucket::new(&config, 0);

        // 10 tokens/s: after 500ms, 5 tokens.
        bucket.refill(500_000);
        assert_eq!(bucket.available_tokens(), 5);
    }

    #[test]
    fn test_refill_keeps_sub_token_remainders() {
        let config = TokenBucketConfig::new(100, 10).with_initial_tokens(0);
        let mut bucket = TokenBucket::new(&config, 0);

        // 150ms at 10/s accrues 1 token and half a token of remainder.
        bucket.refill(150_000);
        assert_eq!(bucket.available_tokens(), 1);
        // Another 50ms completes the second token.
        bucket.refill(200_000);
        assert_eq!(bucket.available_tokens(), 2);
    }

    #[test]
    fn test_refill_caps_at_capacity() {
        let config = TokenBucketConfig::new(10, 1000).with_initial_tokens(0);
        let mut bucket = TokenBucket::new(&config, 0);
        bucket.refill(60_000_000);
        assert_eq!(bucket.available_tokens(), 10);
    }

    #[test]
    fn test_wait_time() {
        let config = TokenBucketConfig::new(100, 10).with_initial_tokens(0);
        let bucket = TokenBucket::new(&config, 0);

        // 1 token at 10/s: 100ms.
        assert_eq!(bucket.wait_time_us(1), 100_000);
    }

    #[test]
    fn test_wait_time_zero_when_available() {
        let bucket = TokenBucket::new(&TokenBucketConfig::new(10, 10), 0);
        assert_eq!(bucket.wait_time_us(5), 0);
    }

    #[test]
    fn test_set_rate_changes_accrual() {
        let config = TokenBucketConfig::new(1000, 10).with_initial_tokens(0);
        let mut bucket = TokenBucket::new(&config, 0);

        bucket.set_rate(100, 0);
        bucket.refill(1_000_000);
        assert_eq!(bucket.available_tokens(), 100);
        assert_eq!(bucket.rate(), 100);
    }

    #[test]
    #[should_panic(expected = "refill_rate must be > 0")]
    fn test_zero_rate_panics() {
        let _ = TokenBucket::new(&TokenBucketConfig::new(10, 0), 0);
    }
}
