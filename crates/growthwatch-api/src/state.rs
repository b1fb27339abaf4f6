//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use growthwatch_auth::{IdentityProvider, ProfileStore, SessionGuard, SessionManager};
use growthwatch_core::config::AppConfig;
use growthwatch_entity::user::Role;

use crate::cookies::CookieSettings;

/// Application state passed to every handler via `State<AppState>`.
///
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Per-request session guard
    pub guard: Arc<SessionGuard>,
    /// Login/logout flows
    pub session_manager: Arc<SessionManager>,
    /// Session cookie names and attributes
    pub cookies: Arc<CookieSettings>,
}

impl AppState {
    /// Wires state from configuration and the two collaborators.
    pub fn new(
        config: AppConfig,
        provider: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        let guard = SessionGuard::from_config(
            Arc::clone(&provider),
            Arc::clone(&profiles),
            &config.auth,
            &config.session,
        );
        let session_manager = SessionManager::new(
            provider,
            profiles,
            Role::from(config.auth.required_role.as_str()),
        );
        let cookies = CookieSettings::from_config(&config.session.cookies);

        Self {
            config: Arc::new(config),
            guard: Arc::new(guard),
            session_manager: Arc::new(session_manager),
            cookies: Arc::new(cookies),
        }
    }
}
