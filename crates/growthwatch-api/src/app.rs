//! Application builder: wires collaborators, router and middleware into
//! a running server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use growthwatch_auth::{
    IdentityProvider, LocalIdentityProvider, MemoryProfileStore, PostgresProfileStore,
    ProfileStore, RemoteIdentityProvider,
};
use growthwatch_core::config::{AppConfig, IdentityProviderKind, ProfileBackend};
use growthwatch_core::error::AppError;
use growthwatch_database::{DatabasePool, ProfileRepository};

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Login bodies are tiny; anything larger is refused.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Builds the identity provider selected by configuration.
pub fn build_identity_provider(config: &AppConfig) -> Result<Arc<dyn IdentityProvider>, AppError> {
    match config.identity.provider {
        IdentityProviderKind::Local => Ok(Arc::new(LocalIdentityProvider::with_accounts(
            &config.auth,
            &config.identity.local.accounts,
        ))),
        IdentityProviderKind::Remote => {
            Ok(Arc::new(RemoteIdentityProvider::new(&config.identity.remote)?))
        }
    }
}

/// Builds the profile store selected by configuration.
pub async fn build_profile_store(config: &AppConfig) -> Result<Arc<dyn ProfileStore>, AppError> {
    match config.profiles.backend {
        ProfileBackend::Memory => Ok(Arc::new(MemoryProfileStore::from_seeds(
            &config.profiles.memory.entries,
        ))),
        ProfileBackend::Postgres => {
            let db_config = config.database.as_ref().ok_or_else(|| {
                AppError::configuration(
                    "a [database] section is required for the postgres profile backend",
                )
            })?;
            let pool = DatabasePool::connect(db_config).await?;
            let repository = ProfileRepository::new(pool.pool().clone());
            Ok(Arc::new(PostgresProfileStore::new(repository)))
        }
    }
}

/// Wires application state from configuration.
pub async fn build_state(config: AppConfig) -> Result<AppState, AppError> {
    info!(
        provider = %config.identity.provider,
        profiles = %config.profiles.backend,
        required_role = %config.auth.required_role,
        "Initializing session layer"
    );

    let provider = build_identity_provider(&config)?;
    let profiles = build_profile_store(&config).await?;
    Ok(AppState::new(config, provider, profiles))
}

/// Runs the GrowthWatch server until Ctrl+C or SIGTERM.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    let state = build_state(config).await?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(address = %addr, "GrowthWatch server listening");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    tokio::select! {
        result = server => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = async {
            shutdown_signal().await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(grace_seconds = grace.as_secs(), "Graceful shutdown timed out");
        }
    }

    info!("GrowthWatch server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
