//! Identity provider configuration.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which identity provider backs sign-in and token verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityProviderKind {
    /// In-process provider issuing HS256 tokens for configured accounts.
    #[default]
    Local,
    /// GoTrue-compatible hosted authentication service.
    Remote,
}

impl std::fmt::Display for IdentityProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// Identity provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Selected provider.
    #[serde(default)]
    pub provider: IdentityProviderKind,
    /// Settings for the local provider.
    #[serde(default)]
    pub local: LocalIdentityConfig,
    /// Settings for the remote provider.
    #[serde(default)]
    pub remote: RemoteIdentityConfig,
}

/// Accounts known to the local provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalIdentityConfig {
    /// Seed accounts registered at start-up.
    #[serde(default)]
    pub accounts: Vec<LocalAccountConfig>,
}

/// One seeded local account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalAccountConfig {
    /// Identity id (matches the profile id).
    pub id: Uuid,
    /// Sign-in email.
    pub email: String,
    /// Argon2id PHC string (`growthwatch hash-password`).
    pub password_hash: String,
}

/// Hosted authentication service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteIdentityConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    #[serde(default)]
    pub url: String,
    /// API key sent as the `apikey` header.
    #[serde(default)]
    pub api_key: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for RemoteIdentityConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}
