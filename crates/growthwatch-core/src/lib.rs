//! # growthwatch-core
//!
//! Core crate for the GrowthWatch admin dashboard. Contains the
//! configuration schema, the unified error system and the shared
//! result alias.
//!
//! This crate has **no** internal dependencies on other GrowthWatch crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::AppError;
pub use result::AppResult;
