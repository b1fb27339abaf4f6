//! Profile repository over the program's `users` table.

use sqlx::PgPool;
use uuid::Uuid;

use growthwatch_core::error::{AppError, ErrorKind};
use growthwatch_core::result::AppResult;
use growthwatch_entity::user::Profile;

const FIND_BY_ID: &str =
    "SELECT id_users, COALESCE(name, '') AS name, role FROM users WHERE id_users = $1";

/// Read-only access to user profiles.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Create a new profile repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a profile by identity id.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Profile>> {
        sqlx::query_as::<_, Profile>(FIND_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find profile by id", e)
            })
    }
}
