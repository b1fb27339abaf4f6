//! Session guard state machine.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use growthwatch_core::config::{AuthConfig, SessionConfig};
use growthwatch_entity::session::{Session, SessionCredentials};
use growthwatch_entity::user::{Identity, Role, Subject};

use crate::profile::{ProfileError, ProfileStore};
use crate::provider::{IdentityProvider, ProviderError};

use super::credentials::CredentialStore;
use super::outcome::{AuthorizedSession, DenyReason, Outcome};
use super::policy::RefreshPolicy;

/// Decides whether a caller holds a valid admin session.
///
/// The guard keeps no state of its own: every decision is a function of the
/// presented credentials and the answers of the two collaborators. Verify
/// completes before refresh, and refresh before the role check.
#[derive(Clone)]
pub struct SessionGuard {
    provider: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    policy: RefreshPolicy,
    required_role: Role,
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("provider", &self.provider.name())
            .field("policy", &self.policy)
            .field("required_role", &self.required_role)
            .finish()
    }
}

impl SessionGuard {
    /// Creates a guard from its collaborators.
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        policy: RefreshPolicy,
        required_role: Role,
    ) -> Self {
        Self {
            provider,
            profiles,
            policy,
            required_role,
        }
    }

    /// Creates a guard with the configured role and lookahead window.
    pub fn from_config(
        provider: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        auth: &AuthConfig,
        session: &SessionConfig,
    ) -> Self {
        Self::new(
            provider,
            profiles,
            RefreshPolicy::new(Duration::from_secs(session.refresh_lookahead_seconds)),
            Role::from(auth.required_role.as_str()),
        )
    }

    /// The role a profile must carry.
    pub fn required_role(&self) -> &Role {
        &self.required_role
    }

    /// The identity provider the guard verifies against.
    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    /// The profile store the guard reads roles from.
    pub fn profiles(&self) -> &Arc<dyn ProfileStore> {
        &self.profiles
    }

    /// Authorizes the credentials held by `store`.
    ///
    /// Refreshes once when the access token is lapsed, invalid or inside the
    /// lookahead window; writes the new pair back to `store` on success and
    /// clears it when the session is irrecoverable.
    pub async fn authorize<S>(&self, store: &mut S) -> Outcome
    where
        S: CredentialStore + Send + ?Sized,
    {
        let outcome = self.evaluate(store).await;
        log_outcome("authorize", &outcome);
        outcome
    }

    /// Forces a refresh of the stored session, then runs the role check.
    pub async fn refresh_now<S>(&self, store: &mut S) -> Outcome
    where
        S: CredentialStore + Send + ?Sized,
    {
        let credentials = store.credentials();
        let outcome = if credentials.access_token().is_none()
            && credentials.refresh_token().is_none()
        {
            Outcome::Denied(DenyReason::NoSession)
        } else {
            match self.refresh(store, &credentials).await {
                Ok(session) => {
                    self.check_role(
                        store,
                        session.user,
                        &session.access_token,
                        session.expires_at,
                        true,
                    )
                    .await
                }
                Err(reason) => Outcome::Denied(reason),
            }
        };
        log_outcome("refresh", &outcome);
        outcome
    }

    async fn evaluate<S>(&self, store: &mut S) -> Outcome
    where
        S: CredentialStore + Send + ?Sized,
    {
        let credentials = store.credentials();
        let Some(access_token) = credentials.access_token() else {
            return Outcome::Denied(DenyReason::NoSession);
        };

        let now = Utc::now().timestamp();
        let verified = match self.provider.verify(access_token).await {
            Ok(verified) if !self.policy.should_refresh(verified.expires_at, now) => {
                Some((verified.subject, verified.expires_at))
            }
            Ok(verified) => {
                debug!(
                    user_id = %verified.subject.id,
                    remaining_seconds = verified.expires_at - now,
                    "Session inside refresh window"
                );
                None
            }
            Err(ProviderError::Unavailable(detail)) => {
                warn!(
                    provider = self.provider.name(),
                    error = %detail,
                    "Token verification unavailable"
                );
                return Outcome::Denied(DenyReason::Unavailable);
            }
            Err(e) => {
                debug!(error = %e, "Access token rejected");
                None
            }
        };

        match verified {
            Some((subject, expires_at)) => {
                self.check_role(store, subject, access_token, expires_at, false)
                    .await
            }
            None => match self.refresh(store, &credentials).await {
                Ok(session) => {
                    self.check_role(
                        store,
                        session.user,
                        &session.access_token,
                        session.expires_at,
                        true,
                    )
                    .await
                }
                Err(reason) => Outcome::Denied(reason),
            },
        }
    }

    async fn refresh<S>(
        &self,
        store: &mut S,
        credentials: &SessionCredentials,
    ) -> Result<Session, DenyReason>
    where
        S: CredentialStore + Send + ?Sized,
    {
        let Some(refresh_token) = credentials.refresh_token() else {
            store.clear();
            return Err(DenyReason::Expired);
        };

        match self.provider.refresh(refresh_token).await {
            Ok(session) => {
                store.set_credentials(&session);
                debug!(
                    user_id = %session.user.id,
                    expires_at = session.expires_at,
                    "Session refreshed"
                );
                Ok(session)
            }
            Err(ProviderError::Unavailable(detail)) => {
                warn!(
                    provider = self.provider.name(),
                    error = %detail,
                    "Token refresh unavailable"
                );
                Err(DenyReason::Unavailable)
            }
            Err(e) => {
                debug!(error = %e, "Token refresh rejected");
                store.clear();
                Err(DenyReason::RefreshFailed)
            }
        }
    }

    async fn check_role<S>(
        &self,
        store: &mut S,
        subject: Subject,
        access_token: &str,
        expires_at: i64,
        refreshed: bool,
    ) -> Outcome
    where
        S: CredentialStore + Send + ?Sized,
    {
        match self.profiles.get_profile(subject.id).await {
            Ok(profile) if profile.role == self.required_role => {
                Outcome::Allowed(AuthorizedSession {
                    identity: Identity::from_parts(&subject, &profile),
                    profile,
                    expires_at,
                    refreshed,
                })
            }
            Ok(profile) => {
                info!(
                    user_id = %subject.id,
                    role = %profile.role,
                    "Role insufficient for dashboard"
                );
                self.forbid(store, &subject, access_token).await
            }
            Err(ProfileError::NotFound) => {
                info!(user_id = %subject.id, "No profile for identity");
                self.forbid(store, &subject, access_token).await
            }
            Err(ProfileError::Unavailable(detail)) => {
                warn!(user_id = %subject.id, error = %detail, "Profile lookup unavailable");
                Outcome::Denied(DenyReason::Unavailable)
            }
        }
    }

    async fn forbid<S>(&self, store: &mut S, subject: &Subject, access_token: &str) -> Outcome
    where
        S: CredentialStore + Send + ?Sized,
    {
        if let Err(e) = self.provider.sign_out(access_token).await {
            warn!(user_id = %subject.id, error = %e, "Sign-out of forbidden session failed");
        }
        store.clear();
        Outcome::Denied(DenyReason::Forbidden)
    }
}

fn log_outcome(operation: &'static str, outcome: &Outcome) {
    match outcome {
        Outcome::Allowed(session) => debug!(
            operation,
            user_id = %session.identity.id,
            refreshed = session.refreshed,
            "Session allowed"
        ),
        Outcome::Denied(reason) => info!(operation, reason = %reason, "Session denied"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use uuid::Uuid;

    use growthwatch_entity::session::VerifiedToken;
    use growthwatch_entity::user::Profile;

    use crate::guard::MemoryCredentials;

    const WINDOW: Duration = Duration::from_secs(600);

    fn now() -> i64 {
        Utc::now().timestamp()
    }

    /// Provider double: tokens are looked up in a table, refresh answers
    /// with a scripted result.
    #[derive(Default)]
    struct StubProvider {
        tokens: Mutex<HashMap<String, Result<VerifiedToken, ProviderError>>>,
        refresh_result: Mutex<Option<Result<Session, ProviderError>>>,
        signed_out: Mutex<HashSet<String>>,
        refresh_calls: AtomicUsize,
    }

    impl StubProvider {
        fn with_token(self, token: &str, result: Result<VerifiedToken, ProviderError>) -> Self {
            self.tokens
                .lock()
                .unwrap()
                .insert(token.to_string(), result);
            self
        }

        fn with_refresh(self, result: Result<Session, ProviderError>) -> Self {
            if let Ok(session) = &result {
                let verified = VerifiedToken {
                    subject: session.user.clone(),
                    expires_at: session.expires_at,
                };
                self.tokens
                    .lock()
                    .unwrap()
                    .insert(session.access_token.clone(), Ok(verified));
            }
            *self.refresh_result.lock().unwrap() = Some(result);
            self
        }
    }

    #[async_trait]
    impl IdentityProvider for StubProvider {
        async fn sign_in(&self, _email: &str, _password: &str) -> Result<Session, ProviderError> {
            Err(ProviderError::InvalidCredentials)
        }

        async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
            self.signed_out
                .lock()
                .unwrap()
                .insert(access_token.to_string());
            Ok(())
        }

        async fn verify(&self, access_token: &str) -> Result<VerifiedToken, ProviderError> {
            if self.signed_out.lock().unwrap().contains(access_token) {
                return Err(ProviderError::TokenInvalid);
            }
            self.tokens
                .lock()
                .unwrap()
                .get(access_token)
                .cloned()
                .unwrap_or(Err(ProviderError::TokenInvalid))
        }

        async fn refresh(&self, _refresh_token: &str) -> Result<Session, ProviderError> {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            self.refresh_result
                .lock()
                .unwrap()
                .clone()
                .unwrap_or(Err(ProviderError::RefreshRejected))
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    struct StubProfiles {
        result: Result<Profile, ProfileError>,
    }

    #[async_trait]
    impl ProfileStore for StubProfiles {
        async fn get_profile(&self, _identity_id: Uuid) -> Result<Profile, ProfileError> {
            self.result.clone()
        }
    }

    fn subject(id: Uuid) -> Subject {
        Subject {
            id,
            email: Some("staff@example.org".to_string()),
        }
    }

    fn verified(id: Uuid, expires_at: i64) -> Result<VerifiedToken, ProviderError> {
        Ok(VerifiedToken {
            subject: subject(id),
            expires_at,
        })
    }

    fn fresh_session(id: Uuid) -> Session {
        Session {
            access_token: "access-2".to_string(),
            refresh_token: "refresh-2".to_string(),
            expires_at: now() + 3600,
            user: subject(id),
        }
    }

    fn profiles(id: Uuid, role: Role) -> Arc<StubProfiles> {
        Arc::new(StubProfiles {
            result: Ok(Profile {
                id,
                name: "Staff".to_string(),
                role,
            }),
        })
    }

    fn guard(provider: Arc<StubProvider>, profiles: Arc<StubProfiles>) -> SessionGuard {
        SessionGuard::new(provider, profiles, RefreshPolicy::new(WINDOW), Role::Admin)
    }

    #[tokio::test]
    async fn test_no_credentials_is_no_session() {
        let id = Uuid::new_v4();
        let guard = guard(Arc::new(StubProvider::default()), profiles(id, Role::Admin));
        let mut store = MemoryCredentials::new();

        assert_eq!(
            guard.authorize(&mut store).await,
            Outcome::Denied(DenyReason::NoSession)
        );
    }

    #[tokio::test]
    async fn test_valid_admin_is_allowed() {
        let id = Uuid::new_v4();
        let provider = Arc::new(
            StubProvider::default().with_token("access-1", verified(id, now() + 3600)),
        );
        let guard = guard(provider, profiles(id, Role::Admin));
        let mut store = MemoryCredentials::with_tokens(Some("access-1"), Some("refresh-1"));

        match guard.authorize(&mut store).await {
            Outcome::Allowed(session) => {
                assert_eq!(session.identity.id, id);
                assert_eq!(session.identity.role, Role::Admin);
                assert!(!session.refreshed);
            }
            other => panic!("expected Allowed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_wrong_role_is_forbidden_and_signed_out() {
        let id = Uuid::new_v4();
        let provider = Arc::new(
            StubProvider::default().with_token("access-1", verified(id, now() + 3600)),
        );
        let guard = guard(provider.clone(), profiles(id, Role::Parent));
        let mut store = MemoryCredentials::with_tokens(Some("access-1"), Some("refresh-1"));

        assert_eq!(
            guard.authorize(&mut store).await,
            Outcome::Denied(DenyReason::Forbidden)
        );
        assert!(store.credentials().is_empty());
        assert_eq!(
            provider.verify("access-1").await.unwrap_err(),
            ProviderError::TokenInvalid
        );
    }

    #[tokio::test]
    async fn test_missing_profile_is_forbidden() {
        let id = Uuid::new_v4();
        let provider = Arc::new(
            StubProvider::default().with_token("access-1", verified(id, now() + 3600)),
        );
        let profiles = Arc::new(StubProfiles {
            result: Err(ProfileError::NotFound),
        });
        let guard = SessionGuard::new(provider, profiles, RefreshPolicy::new(WINDOW), Role::Admin);
        let mut store = MemoryCredentials::with_tokens(Some("access-1"), None);

        assert_eq!(
            guard.authorize(&mut store).await,
            Outcome::Denied(DenyReason::Forbidden)
        );
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed() {
        let id = Uuid::new_v4();
        let provider = Arc::new(
            StubProvider::default()
                .with_token("access-1", Err(ProviderError::TokenExpired))
                .with_refresh(Ok(fresh_session(id))),
        );
        let guard = guard(provider, profiles(id, Role::Admin));
        let mut store = MemoryCredentials::with_tokens(Some("access-1"), Some("refresh-1"));

        match guard.authorize(&mut store).await {
            Outcome::Allowed(session) => assert!(session.refreshed),
            other => panic!("expected Allowed, got {other:?}"),
        }
        assert_eq!(store.credentials().access_token(), Some("access-2"));
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_expired_without_refresh_token() {
        let id = Uuid::new_v4();
        let provider = Arc::new(
            StubProvider::default().with_token("access-1", Err(ProviderError::TokenExpired)),
        );
        let guard = guard(provider.clone(), profiles(id, Role::Admin));
        let mut store = MemoryCredentials::with_tokens(Some("access-1"), None);

        assert_eq!(
            guard.authorize(&mut store).await,
            Outcome::Denied(DenyReason::Expired)
        );
        assert_eq!(store.cleared(), 1);
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejected_refresh_clears_credentials() {
        let id = Uuid::new_v4();
        let provider = Arc::new(
            StubProvider::default()
                .with_token("access-1", Err(ProviderError::TokenInvalid))
                .with_refresh(Err(ProviderError::RefreshRejected)),
        );
        let guard = guard(provider, profiles(id, Role::Admin));
        let mut store = MemoryCredentials::with_tokens(Some("access-1"), Some("refresh-1"));

        assert_eq!(
            guard.authorize(&mut store).await,
            Outcome::Denied(DenyReason::RefreshFailed)
        );
        assert!(store.credentials().is_empty());
        assert!(store.credentials().refresh_token().is_none());
    }

    #[tokio::test]
    async fn test_healthy_session_is_not_mutated() {
        let id = Uuid::new_v4();
        let provider = Arc::new(
            StubProvider::default().with_token("access-1", verified(id, now() + 3600)),
        );
        let guard = guard(provider.clone(), profiles(id, Role::Admin));
        let mut store = MemoryCredentials::with_tokens(Some("access-1"), Some("refresh-1"));

        assert!(guard.authorize(&mut store).await.is_allowed());
        assert!(guard.authorize(&mut store).await.is_allowed());
        assert_eq!(store.writes(), 0);
        assert_eq!(store.cleared(), 0);
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_session_inside_window_is_refreshed_proactively() {
        let id = Uuid::new_v4();
        let provider = Arc::new(
            StubProvider::default()
                .with_token("access-1", verified(id, now() + 180))
                .with_refresh(Ok(fresh_session(id))),
        );
        let guard = guard(provider.clone(), profiles(id, Role::Admin));
        let mut store = MemoryCredentials::with_tokens(Some("access-1"), Some("refresh-1"));

        match guard.authorize(&mut store).await {
            Outcome::Allowed(session) => {
                assert!(session.refreshed);
                assert!(session.expires_at > now() + 600);
            }
            other => panic!("expected Allowed, got {other:?}"),
        }
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_proactive_refresh_is_refresh_failed() {
        let id = Uuid::new_v4();
        let provider = Arc::new(
            StubProvider::default()
                .with_token("access-1", verified(id, now() + 120))
                .with_refresh(Err(ProviderError::RefreshRejected)),
        );
        let guard = guard(provider, profiles(id, Role::Admin));
        let mut store = MemoryCredentials::with_tokens(Some("access-1"), Some("refresh-1"));

        assert_eq!(
            guard.authorize(&mut store).await,
            Outcome::Denied(DenyReason::RefreshFailed)
        );
        assert!(store.credentials().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_provider_keeps_credentials() {
        let id = Uuid::new_v4();
        let provider = Arc::new(StubProvider::default().with_token(
            "access-1",
            Err(ProviderError::Unavailable("connection refused".to_string())),
        ));
        let guard = guard(provider, profiles(id, Role::Admin));
        let mut store = MemoryCredentials::with_tokens(Some("access-1"), Some("refresh-1"));

        assert_eq!(
            guard.authorize(&mut store).await,
            Outcome::Denied(DenyReason::Unavailable)
        );
        assert_eq!(store.cleared(), 0);
        assert_eq!(store.credentials().access_token(), Some("access-1"));
    }

    #[tokio::test]
    async fn test_unavailable_profile_store_is_never_allowed() {
        let id = Uuid::new_v4();
        let provider = Arc::new(
            StubProvider::default().with_token("access-1", verified(id, now() + 3600)),
        );
        let profiles = Arc::new(StubProfiles {
            result: Err(ProfileError::Unavailable("timeout".to_string())),
        });
        let guard = SessionGuard::new(provider, profiles, RefreshPolicy::new(WINDOW), Role::Admin);
        let mut store = MemoryCredentials::with_tokens(Some("access-1"), Some("refresh-1"));

        assert_eq!(
            guard.authorize(&mut store).await,
            Outcome::Denied(DenyReason::Unavailable)
        );
        assert_eq!(store.cleared(), 0);
    }

    #[tokio::test]
    async fn test_refresh_now_rotates_healthy_session() {
        let id = Uuid::new_v4();
        let provider = Arc::new(
            StubProvider::default()
                .with_token("access-1", verified(id, now() + 3600))
                .with_refresh(Ok(fresh_session(id))),
        );
        let guard = guard(provider, profiles(id, Role::Admin));
        let mut store = MemoryCredentials::with_tokens(Some("access-1"), Some("refresh-1"));

        assert!(guard.refresh_now(&mut store).await.is_allowed());
        assert_eq!(store.credentials().refresh_token(), Some("refresh-2"));

        let mut empty = MemoryCredentials::new();
        assert_eq!(
            guard.refresh_now(&mut empty).await,
            Outcome::Denied(DenyReason::NoSession)
        );
    }
}
