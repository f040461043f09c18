//! Reconnect backoff.

use std::time::Duration;

/// Exponential backoff with a ceiling and an attempt limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    base: Duration,
    max_delay: Duration,
    max_attempts: u32,
}

impl BackoffPolicy {
    pub fn new(base: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base,
            max_delay,
            max_attempts,
        }
    }

    /// Delay before the next attempt after `consecutive_errors` failures.
    /// Zero failures (a clean peer close) waits the base delay.
    pub fn delay(&self, consecutive_errors: u32) -> Duration {
        let exponent = consecutive_errors.saturating_sub(1).min(16);
        self.base
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    /// Whether another attempt is allowed.
    pub fn should_retry(&self, consecutive_errors: u32) -> bool {
        consecutive_errors < self.max_attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}
