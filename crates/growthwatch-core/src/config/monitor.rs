//! Client-side session monitor configuration.

use serde::{Deserialize, Serialize};

/// Settings for the client liveness poll and fetch retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between session checks.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Sessions expiring within this many seconds are refreshed by the client.
    #[serde(default = "default_refresh_lookahead")]
    pub refresh_lookahead_seconds: u64,
    /// Delay before the single retry of a request rejected with 401.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// HTTP client timeout in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            refresh_lookahead_seconds: default_refresh_lookahead(),
            retry_delay_ms: default_retry_delay(),
            request_timeout_seconds: default_timeout(),
        }
    }
}

fn default_poll_interval() -> u64 {
    5 * 60
}

fn default_refresh_lookahead() -> u64 {
    5 * 60
}

fn default_retry_delay() -> u64 {
    1000
}

fn default_timeout() -> u64 {
    30
}
