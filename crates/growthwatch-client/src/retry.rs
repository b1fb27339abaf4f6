//! Bounded retry for requests rejected with `401`.

use std::time::Duration;

use reqwest::StatusCode;

/// How many times, and after what delay, a `401` is retried.
///
/// The server may have refreshed the session cookies on the rejected
/// request, so one retry can succeed. Retries never recurse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// One retry after `delay`.
    pub fn new(delay: Duration) -> Self {
        Self {
            max_retries: 1,
            delay,
        }
    }

    /// No retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
        }
    }

    /// Delay before a retry.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// True when attempt number `attempt` (0-based) answered with `status`
    /// may be retried.
    pub fn should_retry(&self, attempt: u32, status: StatusCode) -> bool {
        status == StatusCode::UNAUTHORIZED && attempt < self.max_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}
