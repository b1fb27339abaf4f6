//! Guard decisions.

use std::fmt;

use serde::Serialize;

use growthwatch_core::error::AppError;
use growthwatch_entity::user::{Identity, Profile};

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No access token was presented.
    NoSession,
    /// The access token lapsed and there was no refresh token.
    Expired,
    /// The provider refused the refresh token.
    RefreshFailed,
    /// The session is valid but the profile lacks the required role.
    Forbidden,
    /// The identity provider or profile store could not be reached.
    Unavailable,
}

impl DenyReason {
    /// Stable name used in structured logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSession => "no_session",
            Self::Expired => "expired",
            Self::RefreshFailed => "refresh_failed",
            Self::Forbidden => "forbidden",
            Self::Unavailable => "unavailable",
        }
    }

    /// True when the stored credentials must be dropped.
    pub fn clears_credentials(&self) -> bool {
        matches!(self, Self::Expired | Self::RefreshFailed | Self::Forbidden)
    }

    /// The error returned to programmatic callers.
    ///
    /// Messages stay generic so a denial does not reveal whether an
    /// account exists.
    pub fn to_app_error(&self) -> AppError {
        match self {
            Self::NoSession | Self::Expired | Self::RefreshFailed => {
                AppError::authentication("Session expired or invalid")
            }
            Self::Forbidden => AppError::authorization("Access denied. Admin privileges required."),
            Self::Unavailable => {
                AppError::service_unavailable("Authentication service temporarily unavailable")
            }
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A session the guard let through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizedSession {
    /// Verified identity with its role.
    pub identity: Identity,
    /// The profile the role was read from.
    pub profile: Profile,
    /// Access token expiry (seconds since epoch).
    pub expires_at: i64,
    /// Whether the guard refreshed the session on this call.
    pub refreshed: bool,
}

/// The result of [`super::SessionGuard::authorize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The caller holds a valid, sufficiently privileged session.
    Allowed(AuthorizedSession),
    /// The caller is turned away.
    Denied(DenyReason),
}

impl Outcome {
    /// True for [`Outcome::Allowed`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    /// The deny reason, if denied.
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::Allowed(_) => None,
            Self::Denied(reason) => Some(*reason),
        }
    }

    /// Converts into a `Result` for `?` propagation in handlers.
    pub fn into_result(self) -> Result<AuthorizedSession, AppError> {
        match self {
            Self::Allowed(session) => Ok(session),
            Self::Denied(reason) => Err(reason.to_app_error()),
        }
    }
}
