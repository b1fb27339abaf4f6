//! Response bodies of the session API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Signed-in user summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// Identity id.
    pub id: Uuid,
    /// Sign-in email.
    pub email: Option<String>,
    /// Display name.
    pub name: String,
    /// Role name.
    pub role: String,
}

/// `{success, user}` envelope of login and `me`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: UserSummary,
}

/// Identity carried by a session check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Identity id.
    pub id: Uuid,
    /// Sign-in email.
    pub email: Option<String>,
}

/// Answer of `GET /api/auth/session` and `POST /api/auth/refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Whether the session is valid.
    pub valid: bool,
    /// The session's identity.
    #[serde(default)]
    pub user: Option<SessionUser>,
    /// Access token expiry (seconds since epoch).
    #[serde(rename = "expiresAt", default)]
    pub expires_at: Option<i64>,
    /// Reason for an invalid session.
    #[serde(default)]
    pub message: Option<String>,
}

impl SessionStatus {
    /// True when the session is valid and expires within `lookahead_seconds` of `now`.
    pub fn expires_within(&self, lookahead_seconds: i64, now: i64) -> bool {
        self.valid
            && self
                .expires_at
                .is_some_and(|exp| exp.saturating_sub(now) <= lookahead_seconds)
    }
}

/// Error body `{success:false, error, message}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
