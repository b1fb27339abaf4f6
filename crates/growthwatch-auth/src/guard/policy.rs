//! Proactive refresh policy.

use std::time::Duration;

/// Refresh sessions whose expiry falls inside a fixed lookahead window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    lookahead_seconds: i64,
}

impl RefreshPolicy {
    /// A policy with the given lookahead window.
    pub fn new(lookahead: Duration) -> Self {
        Self {
            lookahead_seconds: i64::try_from(lookahead.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// The lookahead window.
    pub fn lookahead(&self) -> Duration {
        Duration::from_secs(self.lookahead_seconds.unsigned_abs())
    }

    /// True when a session expiring at `expires_at` should be refreshed at `now`.
    pub fn should_refresh(&self, expires_at: i64, now: i64) -> bool {
        expires_at.saturating_sub(now) <= self.lookahead_seconds
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(10 * 60))
    }
}
