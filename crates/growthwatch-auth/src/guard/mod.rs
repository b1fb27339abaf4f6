//! The per-request session guard.
//!
//! For every protected request the guard reads the caller's credentials,
//! verifies them with the identity provider, refreshes near-expiry or
//! lapsed sessions once, and checks the profile role.

pub mod credentials;
pub mod outcome;
pub mod policy;
pub mod session_guard;

pub use credentials::{CredentialStore, MemoryCredentials};
pub use outcome::{AuthorizedSession, DenyReason, Outcome};
pub use policy::RefreshPolicy;
pub use session_guard::SessionGuard;
