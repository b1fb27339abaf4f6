//! # growthwatch-database
//!
//! PostgreSQL connection management and the read-only repository the
//! session layer needs from the program database.

pub mod connection;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::ProfileRepository;
