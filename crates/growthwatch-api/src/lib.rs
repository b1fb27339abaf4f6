//! # growthwatch-api
//!
//! HTTP layer for the GrowthWatch admin dashboard built on Axum.
//!
//! Provides the `/api/auth/*` routes, the page guard that gates the
//! pre-built dashboard frontend, the cookie-backed credential store, and
//! error mapping.

pub mod app;
pub mod cookies;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use error::ApiError;
pub use state::AppState;
