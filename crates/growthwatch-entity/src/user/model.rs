//! Identity and profile models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::Role;

/// The authenticated subject of a token, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Identity id assigned by the provider.
    pub id: Uuid,
    /// Sign-in email, when the provider reports one.
    pub email: Option<String>,
}

/// A row of the program's `users` table.
///
/// The identity provider owns credentials; this table owns the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    /// Identity id (`id_users`).
    #[sqlx(rename = "id_users")]
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Role attribute.
    #[sqlx(try_from = "String")]
    pub role: Role,
}

/// An authenticated subject joined with its profile role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Identity id.
    pub id: Uuid,
    /// Sign-in email.
    pub email: Option<String>,
    /// Role looked up from the profile store.
    pub role: Role,
}

impl Identity {
    /// Join a verified subject with its profile.
    pub fn from_parts(subject: &Subject, profile: &Profile) -> Self {
        Self {
            id: subject.id,
            email: subject.email.clone(),
            role: profile.role.clone(),
        }
    }
}
