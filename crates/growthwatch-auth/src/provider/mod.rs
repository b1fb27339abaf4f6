//! The identity provider seam.
//!
//! The provider owns credentials: it signs users in and out, verifies
//! access tokens and exchanges refresh tokens. Roles live elsewhere, see
//! [`crate::profile`].

pub mod local;
pub mod remote;

use async_trait::async_trait;
use thiserror::Error;

use growthwatch_core::error::AppError;
use growthwatch_entity::session::{Session, VerifiedToken};

pub use local::LocalIdentityProvider;
pub use remote::RemoteIdentityProvider;

/// Failures reported by an identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Email/password pair was rejected.
    #[error("invalid login credentials")]
    InvalidCredentials,
    /// The access token has expired.
    #[error("access token expired")]
    TokenExpired,
    /// The access token is malformed, foreign or revoked.
    #[error("access token invalid")]
    TokenInvalid,
    /// The refresh token was refused.
    #[error("refresh token rejected")]
    RefreshRejected,
    /// The provider could not be reached or answered with a server error.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    /// True for transport failures, which say nothing about the session itself.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::InvalidCredentials => {
                AppError::authentication("Invalid email or password")
            }
            ProviderError::TokenExpired
            | ProviderError::TokenInvalid
            | ProviderError::RefreshRejected => {
                AppError::authentication("Session expired or invalid")
            }
            ProviderError::Unavailable(detail) => AppError::with_source(
                growthwatch_core::error::ErrorKind::ServiceUnavailable,
                "Authentication service unavailable",
                ProviderError::Unavailable(detail),
            ),
        }
    }
}

/// Sign-in, sign-out, verification and refresh primitives.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Exchanges an email/password pair for a new session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ProviderError>;

    /// Ends the session the access token belongs to.
    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError>;

    /// Verifies an access token and returns its subject and expiry.
    async fn verify(&self, access_token: &str) -> Result<VerifiedToken, ProviderError>;

    /// Exchanges a refresh token for a new session.
    async fn refresh(&self, refresh_token: &str) -> Result<Session, ProviderError>;

    /// Short provider name for logs.
    fn name(&self) -> &'static str;
}
