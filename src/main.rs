//! GrowthWatch server: admin session layer for the child-growth dashboard.
//!
//! Loads configuration, initializes logging and serves the API and the
//! guarded pages until Ctrl+C or SIGTERM.

use tracing_subscriber::{EnvFilter, fmt};

use growthwatch_core::config::AppConfig;
use growthwatch_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        provider = %config.identity.provider,
        profiles = %config.profiles.backend,
        "Starting GrowthWatch"
    );

    if let Err(e) = growthwatch_api::run_server(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and the environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let dir = std::env::var("GROWTHWATCH_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("GROWTHWATCH_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load_from(&dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
