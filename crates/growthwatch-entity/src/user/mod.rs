//! User domain entities.

pub mod model;
pub mod role;

pub use model::{Identity, Profile, Subject};
pub use role::Role;
