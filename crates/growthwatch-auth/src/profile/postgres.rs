//! Profiles read from the program database.

use async_trait::async_trait;
use tracing::error;
use uuid::Uuid;

use growthwatch_database::ProfileRepository;
use growthwatch_entity::user::Profile;

use super::{ProfileError, ProfileStore};

/// Looks profiles up in the `users` table.
#[derive(Debug, Clone)]
pub struct PostgresProfileStore {
    repository: ProfileRepository,
}

impl PostgresProfileStore {
    /// Wraps a profile repository.
    pub fn new(repository: ProfileRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    async fn get_profile(&self, identity_id: Uuid) -> Result<Profile, ProfileError> {
        match self.repository.find_by_id(identity_id).await {
            Ok(Some(profile)) => Ok(profile),
            Ok(None) => Err(ProfileError::NotFound),
            Err(e) => {
                error!(user_id = %identity_id, error = %e, "Profile lookup failed");
                Err(ProfileError::Unavailable(e.message))
            }
        }
    }
}
