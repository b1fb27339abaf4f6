//! Session lifecycle manager: the admin sign-in and sign-out flows.

use std::sync::Arc;

use tracing::{info, warn};

use growthwatch_core::error::AppError;
use growthwatch_entity::session::Session;
use growthwatch_entity::user::{Identity, Profile, Role};

use crate::guard::CredentialStore;
use crate::profile::{ProfileError, ProfileStore};
use crate::provider::{IdentityProvider, ProviderError};

/// Result of a successful admin login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// The session now held by the credential store.
    pub session: Session,
    /// The authenticated identity.
    pub identity: Identity,
    /// The identity's profile.
    pub profile: Profile,
}

/// Runs the admin login and logout flows against the identity provider.
#[derive(Clone)]
pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    required_role: Role,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("provider", &self.provider.name())
            .field("required_role", &self.required_role)
            .finish()
    }
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        required_role: Role,
    ) -> Self {
        Self {
            provider,
            profiles,
            required_role,
        }
    }

    /// Performs the admin login flow:
    ///
    /// 1. Password sign-in at the identity provider
    /// 2. Profile lookup
    /// 3. Role check
    /// 4. Store the session credentials
    ///
    /// A session that fails step 2 or 3 is signed out before returning, so
    /// nothing usable is left behind.
    pub async fn login<S>(
        &self,
        email: &str,
        password: &str,
        store: &mut S,
    ) -> Result<LoginResult, AppError>
    where
        S: CredentialStore + Send + ?Sized,
    {
        let session = self
            .provider
            .sign_in(email, password)
            .await
            .map_err(|e| match e {
                ProviderError::InvalidCredentials => {
                    info!("Login rejected: invalid credentials");
                    AppError::authentication("Invalid email or password")
                }
                other => AppError::from(other),
            })?;

        let profile = match self.profiles.get_profile(session.user.id).await {
            Ok(profile) => profile,
            Err(ProfileError::NotFound) => {
                warn!(user_id = %session.user.id, "Login without a profile row");
                self.abandon(&session).await;
                return Err(AppError::not_found("User profile not found"));
            }
            Err(e) => {
                self.abandon(&session).await;
                return Err(AppError::from(e));
            }
        };

        if profile.role != self.required_role {
            info!(
                user_id = %session.user.id,
                role = %profile.role,
                "Login rejected: role insufficient"
            );
            self.abandon(&session).await;
            return Err(AppError::authorization(
                "Access denied. Admin privileges required.",
            ));
        }

        store.set_credentials(&session);
        info!(user_id = %session.user.id, expires_at = session.expires_at, "Login successful");

        Ok(LoginResult {
            identity: Identity::from_parts(&session.user, &profile),
            profile,
            session,
        })
    }

    /// Signs the stored session out at the provider (best effort) and
    /// clears the credentials.
    pub async fn logout<S>(&self, store: &mut S)
    where
        S: CredentialStore + Send + ?Sized,
    {
        let credentials = store.credentials();
        if let Some(access_token) = credentials.access_token() {
            match self.provider.sign_out(access_token).await {
                Ok(()) => info!("Logout successful"),
                Err(e) => warn!(error = %e, "Provider sign-out failed during logout"),
            }
        }
        store.clear();
    }

    async fn abandon(&self, session: &Session) {
        if let Err(e) = self.provider.sign_out(&session.access_token).await {
            warn!(user_id = %session.user.id, error = %e, "Failed to sign out rejected login");
        }
    }
}
