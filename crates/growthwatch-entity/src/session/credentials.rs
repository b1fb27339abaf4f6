//! Credentials presented by a caller.

use serde::{Deserialize, Serialize};

use super::model::Session;

/// The token pair a caller presents, as read from a credential store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredentials {
    /// Access token, if present.
    pub access_token: Option<String>,
    /// Refresh token, if present.
    pub refresh_token: Option<String>,
}

impl SessionCredentials {
    /// Credentials carrying both tokens of a session.
    pub fn from_session(session: &Session) -> Self {
        Self {
            access_token: Some(session.access_token.clone()),
            refresh_token: Some(session.refresh_token.clone()),
        }
    }

    /// Access token, ignoring blank values.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Refresh token, ignoring blank values.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }

    /// True when no access token is present.
    pub fn is_empty(&self) -> bool {
        self.access_token().is_none()
    }
}
