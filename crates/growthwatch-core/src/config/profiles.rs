//! Profile store configuration.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where identity roles are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileBackend {
    /// Profiles seeded from configuration and kept in memory.
    #[default]
    Memory,
    /// The `users` table of the program database.
    Postgres,
}

impl std::fmt::Display for ProfileBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Postgres => write!(f, "postgres"),
        }
    }
}

/// Profile store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileStoreConfig {
    /// Selected backend.
    #[serde(default)]
    pub backend: ProfileBackend,
    /// Seed data for the memory backend.
    #[serde(default)]
    pub memory: MemoryProfilesConfig,
}

/// Seed data for the in-memory profile store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryProfilesConfig {
    /// Profiles registered at start-up.
    #[serde(default)]
    pub entries: Vec<ProfileSeed>,
}

/// One seeded profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSeed {
    /// Identity id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Role name, e.g. `"Admin"` or `"Parent"`.
    pub role: String,
}
