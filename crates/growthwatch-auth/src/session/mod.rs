//! Login and logout flows.

pub mod manager;

pub use manager::{LoginResult, SessionManager};
