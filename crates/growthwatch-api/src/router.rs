//! Route definitions.
//!
//! API routes are mounted under `/api`; everything else falls through to
//! the pre-built dashboard pages behind the page guard.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and guard middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(admin_routes(state.clone()))
        .merge(health_routes());

    let pages =
        ServeDir::new(&state.config.server.pages_dir).append_index_html_on_directories(true);

    Router::new()
        .nest("/api", api_routes)
        .fallback_service(pages)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::guard::page_guard,
        ))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Session endpoints: login, logout, session check, refresh
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/session", get(handlers::auth::session))
        .route("/auth/refresh", post(handlers::auth::refresh))
}

/// Endpoints that require an authorized admin session
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::guard::require_admin,
        ))
}

/// Liveness probe
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
