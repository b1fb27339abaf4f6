//! Profiles held in memory, seeded from configuration.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use growthwatch_core::config::ProfileSeed;
use growthwatch_entity::user::{Profile, Role};

use super::{ProfileError, ProfileStore};

/// A concurrent map of profiles keyed by identity id.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: DashMap<Uuid, Profile>,
}

impl MemoryProfileStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded from configuration.
    pub fn from_seeds(seeds: &[ProfileSeed]) -> Self {
        let store = Self::new();
        for seed in seeds {
            store.upsert(Profile {
                id: seed.id,
                name: seed.name.clone(),
                role: Role::from(seed.role.as_str()),
            });
        }
        store
    }

    /// Inserts or replaces a profile.
    pub fn upsert(&self, profile: Profile) {
        self.profiles.insert(profile.id, profile);
    }

    /// Removes a profile.
    pub fn remove(&self, id: &Uuid) -> Option<Profile> {
        self.profiles.remove(id).map(|(_, profile)| profile)
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get_profile(&self, identity_id: Uuid) -> Result<Profile, ProfileError> {
        self.profiles
            .get(&identity_id)
            .map(|entry| entry.value().clone())
            .ok_or(ProfileError::NotFound)
    }
}
