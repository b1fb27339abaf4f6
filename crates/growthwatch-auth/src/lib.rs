//! # growthwatch-auth
//!
//! Session validity and token refresh for the GrowthWatch admin dashboard.
//!
//! ## Modules
//!
//! - `jwt`: HS256 token creation, validation and the revocation list
//! - `password`: Argon2id password hashing
//! - `provider`: the identity provider seam with local and remote implementations
//! - `profile`: role lookup with in-memory and PostgreSQL implementations
//! - `guard`: the per-request session guard and its refresh policy
//! - `session`: login and logout flows

pub mod guard;
pub mod jwt;
pub mod password;
pub mod profile;
pub mod provider;
pub mod session;

pub use guard::{
    AuthorizedSession, CredentialStore, DenyReason, MemoryCredentials, Outcome, RefreshPolicy,
    SessionGuard,
};
pub use jwt::{Claims, JwtDecoder, JwtEncoder, RevocationList};
pub use password::PasswordHasher;
pub use profile::{MemoryProfileStore, PostgresProfileStore, ProfileError, ProfileStore};
pub use provider::{IdentityProvider, LocalIdentityProvider, ProviderError, RemoteIdentityProvider};
pub use session::{LoginResult, SessionManager};
