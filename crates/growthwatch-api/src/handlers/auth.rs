//! Auth handlers: login, logout, session, refresh, me.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use validator::Validate;

use growthwatch_auth::{DenyReason, Outcome};
use growthwatch_core::error::AppError;

use crate::cookies::CookieCredentials;
use crate::dto::request::LoginRequest;
use crate::dto::response::{SessionResponse, SuccessResponse, UserEnvelope, UserResponse};
use crate::error::ApiError;
use crate::extractors::AdminUser;
use crate::state::AppState;

const INVALID_SESSION: &str = "Session expired or invalid";

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<UserEnvelope>), ApiError> {
    let Json(req) =
        payload.map_err(|e| AppError::validation(format!("Invalid request body: {e}")))?;
    let req = req.normalized();
    req.validate()
        .map_err(|_| AppError::validation("Email and password are required"))?;

    let mut store = CookieCredentials::new(jar, &state.cookies);
    let result = state
        .session_manager
        .login(&req.email, &req.password, &mut store)
        .await?;

    Ok((
        store.into_jar(),
        Json(UserEnvelope {
            success: true,
            user: UserResponse::new(&result.identity, &result.profile),
        }),
    ))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<SuccessResponse>) {
    let mut store = CookieCredentials::new(jar, &state.cookies);
    state.session_manager.logout(&mut store).await;

    (store.into_jar(), Json(SuccessResponse { success: true }))
}

/// GET /api/auth/session
pub async fn session(State(state): State<AppState>, jar: CookieJar) -> Response {
    let mut store = CookieCredentials::new(jar, &state.cookies);
    let outcome = state.guard.authorize(&mut store).await;
    (store.into_jar(), session_response(outcome)).into_response()
}

/// POST /api/auth/refresh
pub async fn refresh(State(state): State<AppState>, jar: CookieJar) -> Response {
    let mut store = CookieCredentials::new(jar, &state.cookies);
    let outcome = state.guard.refresh_now(&mut store).await;
    (store.into_jar(), session_response(outcome)).into_response()
}

/// GET /api/auth/me
pub async fn me(AdminUser(session): AdminUser) -> Json<UserEnvelope> {
    Json(UserEnvelope {
        success: true,
        user: UserResponse::new(&session.identity, &session.profile),
    })
}

fn session_response(outcome: Outcome) -> (StatusCode, Json<SessionResponse>) {
    match outcome {
        Outcome::Allowed(session) => (StatusCode::OK, Json(SessionResponse::valid(&session))),
        Outcome::Denied(DenyReason::Unavailable) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(SessionResponse::invalid(
                "Authentication service temporarily unavailable",
            )),
        ),
        Outcome::Denied(_) => (
            StatusCode::UNAUTHORIZED,
            Json(SessionResponse::invalid(INVALID_SESSION)),
        ),
    }
}
