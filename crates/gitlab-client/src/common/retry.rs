//! Retry policy for the HTTP transport
//!
//! Transient failures (5xx, 429, connect errors) are retried with
//! exponential backoff capped at `max_delay`. Timeouts are only retried for
//! idempotent methods: a timed-out POST may already have created the entity.
//! A `Retry-After` header, when present, overrides the computed delay (still
//! capped).

use reqwest::Method;
use std::time::Duration;

/// Exponential backoff settings
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 disables retrying)
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// No retries at all
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-indexed): base * 2^attempt, capped
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        if let Some(retry_after) = retry_after {
            return retry_after.min(self.max_delay);
        }
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Whether an HTTP status should be retried
    pub fn is_retryable_status(status: u16) -> bool {
        status == 429 || (500..600).contains(&status)
    }

    /// Whether a request that timed out may be sent again
    pub fn retries_timeout(method: &Method) -> bool {
        !matches!(*method, Method::POST | Method::PATCH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_grows_exponentially_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0, None), Duration::from_millis(500));
        assert_eq!(policy.delay_for(1, None), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2, None), Duration::from_secs(2));
        assert_eq!(policy.delay_for(5, None), Duration::from_secs(8));
        assert_eq!(policy.delay_for(40, None), Duration::from_secs(8));
    }

    #[test]
    fn test_retry_after_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0, Some(Duration::from_secs(2))), Duration::from_secs(2));
        assert_eq!(policy.delay_for(0, Some(Duration::from_secs(120))), Duration::from_secs(8));
    }

    #[test]
    fn test_timeouts_retry_only_idempotent_methods() {
        assert!(RetryPolicy::retries_timeout(&Method::GET));
        assert!(RetryPolicy::retries_timeout(&Method::PUT));
        assert!(RetryPolicy::retries_timeout(&Method::DELETE));
        assert!(!RetryPolicy::retries_timeout(&Method::POST));
        assert!(!RetryPolicy::retries_timeout(&Method::PATCH));
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(RetryPolicy::is_retryable_status(429));
        assert!(RetryPolicy::is_retryable_status(502));
        assert!(!RetryPolicy::is_retryable_status(404));
        assert!(!RetryPolicy::is_retryable_status(400));
    }
}
