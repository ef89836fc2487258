//! Reconnection backoff policy

use std::time::Duration;

/// Exponential backoff for WebSocket reconnection
///
/// The delay before retry `n` is `multiplier^n` seconds, capped at
/// `max_delay`. Retries continue until the subscription's cancellation
/// signal fires; there is no attempt limit.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Base of the exponential curve (e.g. 2.0 doubles the delay each attempt)
    pub multiplier: f64,
    /// Maximum delay between attempts
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            multiplier: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backoff multiplier
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Set the maximum delay
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Calculate the delay for a given attempt number (1-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay = Duration::from_secs_f64(self.multiplier.powi(exponent).min(86_400.0));
        std::cmp::min(delay, self.max_delay)
    }
}
