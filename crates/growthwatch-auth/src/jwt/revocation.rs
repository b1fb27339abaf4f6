//! In-process revocation list for token ids and session ids.

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;
use uuid::Uuid;

/// Shortest time an entry is kept, so a token revoked at the edge of its
/// lifetime cannot slip through clock skew leeway.
const MIN_TTL: Duration = Duration::from_secs(60);

/// Expires each entry after the TTL stored as its value.
struct PerEntryTtl;

impl Expiry<String, Duration> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Duration,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(*value)
    }
}

/// Revoked token ids (`jti`) and session ids (`sid`).
///
/// Entries live only as long as the token they shadow could still verify.
/// The list is unbounded: evicting an entry early would let a revoked token
/// verify again, so expiry alone bounds its size.
#[derive(Clone)]
pub struct RevocationList {
    entries: Cache<String, Duration>,
}

impl std::fmt::Debug for RevocationList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevocationList")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl RevocationList {
    /// Creates an empty revocation list.
    pub fn new() -> Self {
        Self {
            entries: Cache::builder()
                .expire_after(PerEntryTtl)
                .build(),
        }
    }

    /// Revokes a single token for its remaining lifetime.
    pub async fn revoke_token(&self, jti: Uuid, remaining_ttl_seconds: u64) {
        self.entries
            .insert(token_key(&jti), ttl(remaining_ttl_seconds))
            .await;
    }

    /// Revokes every token of a session.
    pub async fn revoke_session(&self, sid: Uuid, ttl_seconds: u64) {
        self.entries.insert(session_key(&sid), ttl(ttl_seconds)).await;
    }

    /// Checks whether a token id has been revoked.
    pub fn is_token_revoked(&self, jti: &Uuid) -> bool {
        self.entries.contains_key(&token_key(jti))
    }

    /// Checks whether a session id has been revoked.
    pub fn is_session_revoked(&self, sid: &Uuid) -> bool {
        self.entries.contains_key(&session_key(sid))
    }
}

impl Default for RevocationList {
    fn default() -> Self {
        Self::new()
    }
}

fn token_key(jti: &Uuid) -> String {
    format!("jti:{jti}")
}

fn session_key(sid: &Uuid) -> String {
    format!("sid:{sid}")
}

fn ttl(seconds: u64) -> Duration {
    Duration::from_secs(seconds).max(MIN_TTL)
}
