//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::Subject;

/// A session issued by the identity provider.
///
/// Created on password sign-in and replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token presented on every request.
    pub access_token: String,
    /// Token exchanged for a new session once the access token lapses.
    pub refresh_token: String,
    /// Access token expiry (seconds since epoch).
    pub expires_at: i64,
    /// The subject the session belongs to.
    pub user: Subject,
}

impl Session {
    /// Returns the expiry as a `DateTime<Utc>`.
    pub fn expires_at_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.expires_at, 0).unwrap_or_else(Utc::now)
    }

    /// Checks whether the access token has expired at `now`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }

    /// Seconds until expiry at `now` (0 if expired).
    pub fn remaining_seconds(&self, now: i64) -> u64 {
        u64::try_from(self.expires_at - now).unwrap_or(0)
    }
}

/// Result of a successful access-token verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedToken {
    /// The token's subject.
    pub subject: Subject,
    /// Token expiry (seconds since epoch).
    pub expires_at: i64,
}
