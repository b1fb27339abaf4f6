//! Response DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use growthwatch_auth::AuthorizedSession;
use growthwatch_entity::user::{Identity, Profile};

/// Profile summary returned by login and `me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// Identity id.
    pub id: Uuid,
    /// Sign-in email.
    pub email: Option<String>,
    /// Display name.
    pub name: String,
    /// Role name.
    pub role: String,
}

impl UserResponse {
    /// Builds the summary from an identity and its profile.
    pub fn new(identity: &Identity, profile: &Profile) -> Self {
        Self {
            id: identity.id,
            email: identity.email.clone(),
            name: profile.name.clone(),
            role: profile.role.to_string(),
        }
    }
}

/// Body of `POST /api/auth/login` and `GET /api/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEnvelope {
    /// Always `true`.
    pub success: bool,
    /// The signed-in user.
    pub user: UserResponse,
}

/// Body of `POST /api/auth/logout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    /// Always `true`.
    pub success: bool,
}

/// Identity summary carried by a session check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    /// Identity id.
    pub id: Uuid,
    /// Sign-in email.
    pub email: Option<String>,
}

/// Body of `GET /api/auth/session` and `POST /api/auth/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Whether the session is valid.
    pub valid: bool,
    /// The session's identity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
    /// Access token expiry (seconds since epoch).
    #[serde(rename = "expiresAt", skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    /// Reason for an invalid session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SessionResponse {
    /// A valid session.
    pub fn valid(session: &AuthorizedSession) -> Self {
        Self {
            valid: true,
            user: Some(SessionUser {
                id: session.identity.id,
                email: session.identity.email.clone(),
            }),
            expires_at: Some(session.expires_at),
            message: None,
        }
    }

    /// An invalid session with a generic message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            user: None,
            expires_at: None,
            message: Some(message.into()),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Crate version.
    pub version: String,
}
