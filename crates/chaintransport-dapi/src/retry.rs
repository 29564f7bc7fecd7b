//! Bounded exponential backoff for connection-level failures.

use std::time::Duration;

/// Backoff schedule for DAPI requests.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (not counting the first try).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Cap on the delay between attempts.
    pub max_backoff: Duration,
    /// Multiplier applied to the delay on each retry.
    pub multiplier: f64,
}

impl RetryPolicy {
    /// Policy with `max_retries` and the default backoff curve
    /// (250ms, doubling, capped at 5s).
    pub fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }

    /// Returns the delay before the `attempt`-th retry (1-based), or `None`
    /// once `attempt` exceeds `max_retries`.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_retries {
            return None;
        }
        let base_ms = self.initial_backoff.as_millis() as f64
            * self.multiplier.powi((attempt - 1) as i32);
        let capped_ms = base_ms.min(self.max_backoff.as_millis() as f64);
        Some(Duration::from_millis(capped_ms as u64))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_retries(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubling_delays() {
        let policy = RetryPolicy {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
        };
        assert_eq!(policy.next_delay(1), Some(Duration::from_millis(100)));
        assert_eq!(policy.next_delay(2), Some(Duration::from_millis(200)));
        assert_eq!(policy.next_delay(3), Some(Duration::from_millis(400)));
        assert!(policy.next_delay(4).is_none());
    }

    #[test]
    fn delay_capped_at_max() {
        let policy = RetryPolicy::with_retries(10);
        let d9 = policy.next_delay(9).unwrap();
        assert_eq!(d9, Duration::from_secs(5), "d9={d9:?} should hit the cap");
    }

    #[test]
    fn zero_retries_never_retries() {
        let policy = RetryPolicy::with_retries(0);
        assert!(policy.next_delay(1).is_none());
    }
}
