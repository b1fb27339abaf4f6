//! Session guard middleware for pages and protected API routes.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use tracing::debug;

use growthwatch_auth::Outcome;

use crate::cookies::CookieCredentials;
use crate::error::ApiError;
use crate::state::AppState;

/// Path prefixes served without a session check.
const PUBLIC_PREFIXES: &[&str] = &["/api", "/_next/static", "/_next/image", "/favicon.ico"];

/// Image extensions served without a session check.
const ASSET_EXTENSIONS: &[&str] = &[".svg", ".png", ".jpg", ".jpeg", ".gif", ".webp", ".ico"];

/// True for requests the page guard lets through untouched.
pub fn is_unguarded(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    PUBLIC_PREFIXES
        .iter()
        .any(|prefix| lower == *prefix || lower.starts_with(&format!("{prefix}/")))
        || ASSET_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

fn is_login_path(path: &str, login_path: &str) -> bool {
    path == login_path || path.strip_prefix(login_path).is_some_and(|rest| rest.starts_with('/'))
}

/// Gates every page request.
///
/// Denied callers are redirected to the sign-in page; an authorized caller
/// visiting the sign-in page is redirected to the dashboard home. API routes
/// and static assets pass through untouched.
pub async fn page_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if is_unguarded(&path) {
        return next.run(request).await;
    }

    let server = &state.config.server;
    let mut store = CookieCredentials::new(jar, &state.cookies);
    let outcome = state.guard.authorize(&mut store).await;
    let jar = store.into_jar();

    match (outcome, is_login_path(&path, &server.login_path)) {
        (Outcome::Allowed(_), true) => {
            (jar, Redirect::temporary(&server.home_path)).into_response()
        }
        (Outcome::Allowed(_), false) | (Outcome::Denied(_), true) => {
            let response = next.run(request).await;
            (jar, response).into_response()
        }
        (Outcome::Denied(reason), false) => {
            debug!(path = %path, reason = %reason, "Redirecting to sign-in");
            (jar, Redirect::temporary(&server.login_path)).into_response()
        }
    }
}

/// Requires an authorized admin session for API routes.
///
/// The authorized session is stored in request extensions for
/// [`crate::extractors::AdminUser`].
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let mut store = CookieCredentials::new(jar, &state.cookies);
    let outcome = state.guard.authorize(&mut store).await;
    let jar = store.into_jar();

    match outcome {
        Outcome::Allowed(session) => {
            request.extensions_mut().insert(session);
            let response = next.run(request).await;
            (jar, response).into_response()
        }
        Outcome::Denied(reason) => (jar, ApiError(reason.to_app_error())).into_response(),
    }
}
