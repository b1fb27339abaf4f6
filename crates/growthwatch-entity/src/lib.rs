//! # growthwatch-entity
//!
//! Domain entity models shared by the GrowthWatch crates. Profiles map a
//! row of the program's `users` table; sessions and credentials are value
//! objects handed between the identity provider, the session guard and the
//! HTTP layer.

pub mod session;
pub mod user;

pub use session::{Session, SessionCredentials, VerifiedToken};
pub use user::{Identity, Profile, Role, Subject};
