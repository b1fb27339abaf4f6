//! # growthwatch-client
//!
//! Client side of the GrowthWatch session layer: a cookie-aware HTTP client
//! whose requests retry once on `401`, and a cancellable monitor that polls
//! the session endpoint and refreshes near-expiry sessions.

pub mod client;
pub mod error;
pub mod event;
pub mod monitor;
pub mod retry;
pub mod types;

pub use client::AuthClient;
pub use error::ClientError;
pub use event::SessionEvent;
pub use monitor::{MonitorHandle, SessionMonitor};
pub use retry::RetryPolicy;
