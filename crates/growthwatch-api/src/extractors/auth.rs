//! `AdminUser` extractor: the session authorized by `require_admin`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use growthwatch_auth::AuthorizedSession;
use growthwatch_core::error::AppError;

use crate::error::ApiError;

/// The authorized admin session of the current request.
///
/// Only available on routes behind [`crate::middleware::guard::require_admin`].
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthorizedSession);

impl std::ops::Deref for AdminUser {
    type Target = AuthorizedSession;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthorizedSession>()
            .cloned()
            .map(AdminUser)
            .ok_or_else(|| ApiError(AppError::authentication("Session expired or invalid")))
    }
}
