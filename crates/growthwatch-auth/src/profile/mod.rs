//! Role lookup for authenticated identities.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use growthwatch_core::error::{AppError, ErrorKind};
use growthwatch_entity::user::Profile;

pub use memory::MemoryProfileStore;
pub use postgres::PostgresProfileStore;

/// Failures reported by a profile store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    /// No profile row exists for the identity.
    #[error("profile not found")]
    NotFound,
    /// The store could not be reached.
    #[error("profile store unavailable: {0}")]
    Unavailable(String),
}

impl From<ProfileError> for AppError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound => AppError::not_found("User profile not found"),
            ProfileError::Unavailable(_) => {
                AppError::with_source(
                    ErrorKind::ServiceUnavailable,
                    "Profile store unavailable",
                    err,
                )
            }
        }
    }
}

/// Maps an identity id to its profile.
#[async_trait]
pub trait ProfileStore: Send + Sync + 'static {
    /// Fetch the profile for an identity.
    async fn get_profile(&self, identity_id: Uuid) -> Result<Profile, ProfileError>;
}
