//! Retry bounds for archive requests

use std::time::Duration;

/// Maximum number of attempts per archive query
pub const MAX_ATTEMPTS: u32 = 3;

/// Wait between two attempts
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Upper bound for a single attempt (connect, response and body)
pub const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed-delay retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,
    /// Delay before each retry
    pub delay: Duration,
    /// Timeout applied to every attempt
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            delay: RETRY_DELAY,
            attempt_timeout: ATTEMPT_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// Set the attempt ceiling (at least one attempt is always made)
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the delay between attempts
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the per-attempt timeout
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Returns true if a failed `attempt` (1-based) is followed by another one
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(5));
        assert_eq!(policy.attempt_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_should_retry_stops_at_ceiling() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let policy = RetryPolicy::default().max_attempts(0);
        assert_eq!(policy.max_attempts, 1);
        assert!(!policy.should_retry(1));
    }
}
