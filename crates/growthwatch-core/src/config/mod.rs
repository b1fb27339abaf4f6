//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod auth;
pub mod database;
pub mod identity;
pub mod logging;
pub mod monitor;
pub mod profiles;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::database::DatabaseConfig;
pub use self::identity::{
    IdentityConfig, IdentityProviderKind, LocalAccountConfig, LocalIdentityConfig,
    RemoteIdentityConfig,
};
pub use self::logging::LoggingConfig;
pub use self::monitor::MonitorConfig;
pub use self::profiles::{MemoryProfilesConfig, ProfileBackend, ProfileSeed, ProfileStoreConfig};
pub use self::session::{CookieConfig, SessionConfig};

use crate::error::AppError;

/// Placeholder secret shipped in `config/default.toml`.
pub const DEFAULT_JWT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Prefix for environment variable overrides (`GROWTHWATCH_AUTH__JWT_SECRET`).
pub const ENV_PREFIX: &str = "GROWTHWATCH";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Token signing and role requirements.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session refresh policy and cookie settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Identity provider selection.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Profile store selection.
    #[serde(default)]
    pub profiles: ProfileStoreConfig,
    /// Database connection settings (postgres profile backend only).
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    /// Client-side liveness poll settings.
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `GROWTHWATCH_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Load configuration from an explicit directory.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject combinations that would leave the server unable to gate sessions.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        if self.session.cookies.secure && self.auth.jwt_secret == DEFAULT_JWT_SECRET {
            return Err(AppError::configuration(
                "auth.jwt_secret must be changed when secure cookies are enabled",
            ));
        }
        if self.auth.required_role.trim().is_empty() {
            return Err(AppError::configuration("auth.required_role must not be empty"));
        }
        // Otherwise every freshly issued token is already due for refresh.
        if self.auth.jwt_access_ttl_minutes.saturating_mul(60)
            <= self.session.refresh_lookahead_seconds
        {
            return Err(AppError::configuration(
                "auth.jwt_access_ttl_minutes must exceed session.refresh_lookahead_seconds",
            ));
        }

        if self.identity.provider == IdentityProviderKind::Remote {
            let remote = &self.identity.remote;
            if remote.url.trim().is_empty() || remote.api_key.trim().is_empty() {
                return Err(AppError::configuration(
                    "identity.remote.url and identity.remote.api_key are required \
                     for the remote provider",
                ));
            }
        }

        if self.profiles.backend == ProfileBackend::Postgres && self.database.is_none() {
            return Err(AppError::configuration(
                "a [database] section is required for the postgres profile backend",
            ));
        }

        if self.monitor.poll_interval_seconds == 0 {
            return Err(AppError::configuration(
                "monitor.poll_interval_seconds must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Returns a copy with every secret replaced, suitable for printing.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.auth.jwt_secret = mask(&copy.auth.jwt_secret);
        copy.identity.remote.api_key = mask(&copy.identity.remote.api_key);
        for account in &mut copy.identity.local.accounts {
            account.password_hash = mask(&account.password_hash);
        }
        if let Some(db) = copy.database.as_mut() {
            db.url = database::mask_password(&db.url);
        }
        copy
    }
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "****".to_string()
    }
}
