//! Session refresh policy and cookie configuration.

use serde::{Deserialize, Serialize};

/// Session management configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sessions expiring within this many seconds are refreshed pre-emptively.
    #[serde(default = "default_refresh_lookahead")]
    pub refresh_lookahead_seconds: u64,
    /// Cookie names and attributes.
    #[serde(default)]
    pub cookies: CookieConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_lookahead_seconds: default_refresh_lookahead(),
            cookies: CookieConfig::default(),
        }
    }
}

/// Names and attributes of the session cookies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Cookie holding the access token.
    #[serde(default = "default_access_name")]
    pub access_token_name: String,
    /// Cookie holding the refresh token.
    #[serde(default = "default_refresh_name")]
    pub refresh_token_name: String,
    /// Cookie holding the identity id.
    #[serde(default = "default_identity_name")]
    pub identity_name: String,
    /// Cookie lifetime in seconds.
    #[serde(default = "default_max_age")]
    pub max_age_seconds: i64,
    /// Whether to set the `Secure` attribute (production).
    #[serde(default)]
    pub secure: bool,
    /// `SameSite` attribute: `"lax"`, `"strict"` or `"none"`.
    #[serde(default = "default_same_site")]
    pub same_site: String,
    /// Cookie path.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            access_token_name: default_access_name(),
            refresh_token_name: default_refresh_name(),
            identity_name: default_identity_name(),
            max_age_seconds: default_max_age(),
            secure: false,
            same_site: default_same_site(),
            path: default_path(),
        }
    }
}

fn default_refresh_lookahead() -> u64 {
    10 * 60
}

fn default_access_name() -> String {
    "sb-access-token".to_string()
}

fn default_refresh_name() -> String {
    "sb-refresh-token".to_string()
}

fn default_identity_name() -> String {
    "user-id".to_string()
}

fn default_max_age() -> i64 {
    60 * 60 * 24 * 7
}

fn default_same_site() -> String {
    "lax".to_string()
}

fn default_path() -> String {
    "/".to_string()
}
