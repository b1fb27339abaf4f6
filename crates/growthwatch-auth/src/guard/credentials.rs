//! Storage seam for the caller's credentials.

use growthwatch_entity::session::{Session, SessionCredentials};

/// Where the guard reads and writes the caller's token pair.
///
/// The HTTP layer implements this over the request's cookie jar.
pub trait CredentialStore {
    /// Current credentials; empty when none are presented.
    fn credentials(&self) -> SessionCredentials;

    /// Replace the stored credentials with a new session.
    fn set_credentials(&mut self, session: &Session);

    /// Remove all stored credentials.
    fn clear(&mut self);
}

/// A credential store that keeps tokens in memory and counts writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentials {
    current: SessionCredentials,
    writes: usize,
    cleared: usize,
}

impl MemoryCredentials {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the tokens of `session`.
    pub fn from_session(session: &Session) -> Self {
        Self {
            current: SessionCredentials::from_session(session),
            ..Self::default()
        }
    }

    /// A store holding arbitrary tokens.
    pub fn with_tokens(access_token: Option<&str>, refresh_token: Option<&str>) -> Self {
        Self {
            current: SessionCredentials {
                access_token: access_token.map(str::to_string),
                refresh_token: refresh_token.map(str::to_string),
            },
            ..Self::default()
        }
    }

    /// Number of `set_credentials` calls.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Number of `clear` calls.
    pub fn cleared(&self) -> usize {
        self.cleared
    }
}

impl CredentialStore for MemoryCredentials {
    fn credentials(&self) -> SessionCredentials {
        self.current.clone()
    }

    fn set_credentials(&mut self, session: &Session) {
        self.current = SessionCredentials::from_session(session);
        self.writes += 1;
    }

    fn clear(&mut self) {
        self.current = SessionCredentials::default();
        self.cleared += 1;
    }
}
