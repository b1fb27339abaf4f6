//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Token signing and authorization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Role a profile must carry to keep a dashboard session.
    #[serde(default = "default_required_role")]
    pub required_role: String,
    /// Secret key for JWT signing (HMAC-SHA256), used by the local provider.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub jwt_access_ttl_minutes: u64,
    /// Refresh token TTL in hours.
    #[serde(default = "default_refresh_ttl")]
    pub jwt_refresh_ttl_hours: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            required_role: default_required_role(),
            jwt_secret: default_jwt_secret(),
            jwt_access_ttl_minutes: default_access_ttl(),
            jwt_refresh_ttl_hours: default_refresh_ttl(),
        }
    }
}

fn default_required_role() -> String {
    "Admin".to_string()
}

fn default_jwt_secret() -> String {
    super::DEFAULT_JWT_SECRET.to_string()
}

fn default_access_ttl() -> u64 {
    60
}

fn default_refresh_ttl() -> u64 {
    24 * 7
}
