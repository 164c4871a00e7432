//! Retry policy

use std::time::Duration;

use contracts::RetryConfig;

/// Attempt cap plus exponential backoff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, first one included
    pub total: u32,
    /// Seconds multiplier
    pub backoff_factor: f64,
}

impl RetryPolicy {
    pub fn new(total: u32, backoff_factor: f64) -> Self {
        Self {
            total: total.max(1),
            backoff_factor,
        }
    }

    /// Delay after failed attempt `attempt` (1-based): `factor × 2^(attempt-1)` s
    ///
    /// Values too large for a `Duration` saturate.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.backoff_factor * 2f64.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(if secs > 0.0 {
            Duration::MAX
        } else {
            Duration::ZERO
        })
    }

    /// Whether another attempt is allowed after `attempt` failed
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.total
    }

    /// Sum of the delays before attempt `attempts + 1`
    pub fn total_backoff(&self, attempts: u32) -> Duration {
        (1..=attempts)
            .map(|a| self.backoff(a))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.total, config.backoff_factor)
    }
}
