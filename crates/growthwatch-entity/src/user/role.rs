//! Profile role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role attribute stored on a profile.
///
/// Only [`Role::Admin`] may hold a dashboard session. Values the program
/// database knows about but this crate does not are kept verbatim in
/// [`Role::Other`] so they can still be logged and rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Program staff with dashboard access.
    Admin,
    /// A parent using the mobile application.
    Parent,
    /// Any other role string.
    Other(String),
}

impl Role {
    /// Return the canonical role name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "Admin",
            Self::Parent => "Parent",
            Self::Other(name) => name,
        }
    }

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.to_lowercase().as_str() {
            "admin" => Self::Admin,
            "parent" => Self::Parent,
            _ => Self::Other(trimmed.to_string()),
        })
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(role) => role,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}
