//! In-process identity provider backed by configured accounts.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use moka::future::Cache;
use tracing::{debug, info, warn};
use uuid::Uuid;

use growthwatch_core::config::{AuthConfig, LocalAccountConfig};
use growthwatch_entity::session::{Session, VerifiedToken};
use growthwatch_entity::user::Subject;

use crate::jwt::{Claims, JwtDecoder, JwtEncoder, RevocationList, TokenError};
use crate::password::PasswordHasher;

use super::{IdentityProvider, ProviderError};

#[derive(Debug, Clone)]
struct LocalAccount {
    id: Uuid,
    email: String,
    password_hash: String,
}

/// How long a spent refresh token keeps answering with the pair it was
/// rotated into.
pub const DEFAULT_REUSE_INTERVAL: Duration = Duration::from_secs(10);

/// Issues HS256 access/refresh tokens for accounts held in memory.
///
/// Refresh rotates the pair and revokes the spent refresh token. Requests
/// that race on the same refresh token within the reuse interval all receive
/// the rotated pair. Sign-out revokes the whole session id, so neither token
/// of the pair verifies again.
#[derive(Debug)]
pub struct LocalIdentityProvider {
    accounts: DashMap<String, LocalAccount>,
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    hasher: PasswordHasher,
    revocations: RevocationList,
    rotations: Cache<Uuid, Session>,
}

impl LocalIdentityProvider {
    /// Creates a provider with no accounts.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            accounts: DashMap::new(),
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
            hasher: PasswordHasher::new(),
            revocations: RevocationList::new(),
            rotations: rotation_cache(DEFAULT_REUSE_INTERVAL),
        }
    }

    /// Overrides how long a spent refresh token may be replayed.
    pub fn with_reuse_interval(mut self, interval: Duration) -> Self {
        self.rotations = rotation_cache(interval);
        self
    }

    /// Creates a provider seeded with configured accounts.
    pub fn with_accounts(config: &AuthConfig, accounts: &[LocalAccountConfig]) -> Self {
        let provider = Self::new(config);
        for account in accounts {
            provider.add_account(account.id, &account.email, &account.password_hash);
        }
        info!(accounts = provider.accounts.len(), "Local identity provider ready");
        provider
    }

    /// Registers or replaces an account. Emails are matched case-insensitively.
    pub fn add_account(&self, id: Uuid, email: &str, password_hash: &str) {
        self.accounts.insert(
            normalize(email),
            LocalAccount {
                id,
                email: email.trim().to_string(),
                password_hash: password_hash.to_string(),
            },
        );
    }

    /// Signs an access token with an explicit expiry for an existing session.
    ///
    /// Lets callers construct near-expiry or lapsed sessions without waiting.
    #[cfg(any(test, feature = "test-util"))]
    pub fn mint_access_token(
        &self,
        session: &Session,
        expires_at: i64,
    ) -> Result<String, ProviderError> {
        let claims = self
            .decoder
            .decode_access_token_ignoring_expiry(&session.access_token)
            .map_err(|_| ProviderError::TokenInvalid)?;
        self.encoder
            .sign(&Claims {
                exp: expires_at,
                iat: Utc::now().timestamp().min(expires_at),
                jti: Uuid::new_v4(),
                ..claims
            })
            .map_err(|e| ProviderError::Unavailable(e.message))
    }

    fn issue(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        email: Option<&str>,
    ) -> Result<Session, ProviderError> {
        let pair = self
            .encoder
            .generate_token_pair(user_id, session_id, email)
            .map_err(|e| ProviderError::Unavailable(e.message))?;

        Ok(Session {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_at: pair.access_expires_at,
            user: Subject {
                id: user_id,
                email: email.map(str::to_string),
            },
        })
    }

    fn is_revoked(&self, claims: &Claims) -> bool {
        self.revocations.is_session_revoked(&claims.sid)
            || self.revocations.is_token_revoked(&claims.jti)
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ProviderError> {
        let account = self
            .accounts
            .get(&normalize(email))
            .map(|entry| entry.value().clone())
            .ok_or(ProviderError::InvalidCredentials)?;

        let valid = self
            .hasher
            .verify_password(password, &account.password_hash)
            .map_err(|e| {
                warn!(user_id = %account.id, error = %e, "Stored password hash is unusable");
                ProviderError::InvalidCredentials
            })?;
        if !valid {
            return Err(ProviderError::InvalidCredentials);
        }

        let session = self.issue(account.id, Uuid::new_v4(), Some(&account.email))?;
        debug!(user_id = %account.id, "Local sign-in issued session");
        Ok(session)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let claims = self
            .decoder
            .decode_access_token_ignoring_expiry(access_token)
            .map_err(|_| ProviderError::TokenInvalid)?;

        self.revocations
            .revoke_session(claims.sid, self.encoder.refresh_ttl_seconds())
            .await;
        debug!(user_id = %claims.sub, session_id = %claims.sid, "Local session revoked");
        Ok(())
    }

    async fn verify(&self, access_token: &str) -> Result<VerifiedToken, ProviderError> {
        let claims = self
            .decoder
            .decode_access_token(access_token)
            .map_err(|e| match e {
                TokenError::Expired => ProviderError::TokenExpired,
                _ => ProviderError::TokenInvalid,
            })?;

        if self.is_revoked(&claims) {
            return Err(ProviderError::TokenInvalid);
        }

        Ok(VerifiedToken {
            subject: Subject {
                id: claims.sub,
                email: claims.email,
            },
            expires_at: claims.exp,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, ProviderError> {
        let claims = self
            .decoder
            .decode_refresh_token(refresh_token)
            .map_err(|_| ProviderError::RefreshRejected)?;

        if self.revocations.is_session_revoked(&claims.sid) {
            return Err(ProviderError::RefreshRejected);
        }

        // A spent token is revoked only after its rotation is cached, so a
        // revoked jti without a cached rotation is past the reuse interval.
        if self.revocations.is_token_revoked(&claims.jti) {
            return match self.rotations.get(&claims.jti).await {
                Some(session) => {
                    debug!(
                        user_id = %claims.sub,
                        "Spent refresh token reused within interval"
                    );
                    Ok(session)
                }
                None => Err(ProviderError::RefreshRejected),
            };
        }

        let session = self
            .rotations
            .try_get_with(claims.jti, async {
                self.issue(claims.sub, claims.sid, claims.email.as_deref())
            })
            .await
            .map_err(|e| (*e).clone())?;

        self.revocations
            .revoke_token(
                claims.jti,
                claims.remaining_ttl_seconds(Utc::now().timestamp()),
            )
            .await;

        Ok(session)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

fn rotation_cache(interval: Duration) -> Cache<Uuid, Session> {
    Cache::builder().time_to_live(interval).build()
}
