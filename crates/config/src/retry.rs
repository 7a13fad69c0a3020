//! Retry policy for requests that must eventually succeed.
//!
//! The social feed fetch and the license pre-check keep retrying transient
//! failures after a fixed delay. By default there is no attempt limit; setting
//! `max_attempts` bounds the loop.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default delay between attempts (30 seconds).
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 30;

/// How transient failures are retried.
///
/// # Examples
///
/// ```
/// use ghwatch_config::RetryPolicy;
///
/// let policy = RetryPolicy::default();
/// assert!(policy.should_retry(1_000));
///
/// let policy = RetryPolicy::bounded(3, 0);
/// assert!(policy.should_retry(2));
/// assert!(!policy.should_retry(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Seconds to wait between attempts.
    #[serde(default = "default_delay")]
    pub delay_secs: u64,

    /// Total number of attempts, or `None` to retry forever.
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

fn default_delay() -> u64 {
    DEFAULT_RETRY_DELAY_SECS
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay_secs: DEFAULT_RETRY_DELAY_SECS,
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    /// A policy giving up after `max_attempts` attempts.
    #[must_use]
    pub fn bounded(max_attempts: u32, delay_secs: u64) -> Self {
        Self {
            delay_secs,
            max_attempts: Some(max_attempts),
        }
    }

    /// A policy that never gives up.
    #[must_use]
    pub fn unbounded(delay_secs: u64) -> Self {
        Self {
            delay_secs,
            max_attempts: None,
        }
    }

    /// Returns the delay between attempts.
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    /// Returns whether another attempt is allowed after `failures` failed
    /// attempts.
    #[must_use]
    pub fn should_retry(&self, failures: u32) -> bool {
        self.max_attempts.is_none_or(|max| failures < max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unbounded_thirty_seconds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(), Duration::from_secs(30));
        assert!(policy.max_attempts.is_none());
        assert!(policy.should_retry(u32::MAX));
    }

    #[test]
    fn bounded_stops_at_limit() {
        let policy = RetryPolicy::bounded(1, 5);
        assert!(!policy.should_retry(1));
        assert!(policy.should_retry(0));
    }

    #[test]
    fn deserialize_with_defaults() {
        let policy: RetryPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, RetryPolicy::default());

        let policy: RetryPolicy = serde_json::from_str(r#"{"max_attempts": 4}"#).unwrap();
        assert_eq!(policy, RetryPolicy::bounded(4, DEFAULT_RETRY_DELAY_SECS));
    }
}
