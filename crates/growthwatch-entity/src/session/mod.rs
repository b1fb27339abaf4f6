//! Session domain entities.

pub mod credentials;
pub mod model;

pub use credentials::SessionCredentials;
pub use model::{Session, VerifiedToken};
