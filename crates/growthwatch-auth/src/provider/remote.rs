//! Identity provider backed by a GoTrue-compatible REST service.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use growthwatch_core::config::RemoteIdentityConfig;
use growthwatch_core::error::AppError;
use growthwatch_entity::session::{Session, VerifiedToken};
use growthwatch_entity::user::Subject;

use super::{IdentityProvider, ProviderError};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: UserResponse,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    exp: i64,
}

/// Talks to `/auth/v1/*` of a hosted authentication service.
#[derive(Debug, Clone)]
pub struct RemoteIdentityProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RemoteIdentityProvider {
    /// Builds the HTTP client for the configured endpoint.
    pub fn new(config: &RemoteIdentityConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::configuration(format!("Failed to build identity provider client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    async fn token_grant(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, ProviderError> {
        self.client
            .post(self.url(&format!("token?grant_type={grant_type}")))
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(unavailable)
    }

    async fn into_session(response: reqwest::Response) -> Result<Session, ProviderError> {
        let body: TokenResponse = response.json().await.map_err(unavailable)?;
        let expires_at = body
            .expires_at
            .or_else(|| body.expires_in.map(|secs| Utc::now().timestamp() + secs))
            .or_else(|| token_expiry(&body.access_token))
            .ok_or_else(|| {
                ProviderError::Unavailable("token response carried no expiry".to_string())
            })?;

        Ok(Session {
            access_token: body.access_token,
            refresh_token: body.refresh_token,
            expires_at,
            user: Subject {
                id: body.user.id,
                email: body.user.email,
            },
        })
    }
}

#[async_trait]
impl IdentityProvider for RemoteIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ProviderError> {
        let response = self
            .token_grant(
                "password",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await?;

        match response.status() {
            status if status.is_success() => Self::into_session(response).await,
            status if is_transient(status) => Err(server_error(status)),
            status if status.is_client_error() => {
                debug!(status = %status, "Remote sign-in rejected");
                Err(ProviderError::InvalidCredentials)
            }
            status => Err(server_error(status)),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let response = self
            .client
            .post(self.url("logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(unavailable)?;

        match response.status() {
            status if status.is_success() => Ok(()),
            status if is_transient(status) => Err(server_error(status)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                Err(ProviderError::TokenInvalid)
            }
            status => Err(server_error(status)),
        }
    }

    async fn verify(&self, access_token: &str) -> Result<VerifiedToken, ProviderError> {
        let response = self
            .client
            .get(self.url("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(unavailable)?;

        match response.status() {
            status if status.is_success() => {
                let user: UserResponse = response.json().await.map_err(unavailable)?;
                let expires_at = token_expiry(access_token).ok_or(ProviderError::TokenInvalid)?;
                Ok(VerifiedToken {
                    subject: Subject {
                        id: user.id,
                        email: user.email,
                    },
                    expires_at,
                })
            }
            status if is_transient(status) => Err(server_error(status)),
            status if status.is_client_error() => match token_expiry(access_token) {
                Some(exp) if exp <= Utc::now().timestamp() => Err(ProviderError::TokenExpired),
                _ => Err(ProviderError::TokenInvalid),
            },
            status => Err(server_error(status)),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, ProviderError> {
        let response = self
            .token_grant(
                "refresh_token",
                serde_json::json!({ "refresh_token": refresh_token }),
            )
            .await?;

        match response.status() {
            status if status.is_success() => Self::into_session(response).await,
            status if is_transient(status) => Err(server_error(status)),
            status if status.is_client_error() => {
                debug!(status = %status, "Remote refresh rejected");
                Err(ProviderError::RefreshRejected)
            }
            status => Err(server_error(status)),
        }
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

/// Reads `exp` from a JWT payload without checking the signature.
///
/// The signature is the provider's business; this only schedules refreshes.
fn token_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice::<ExpiryClaim>(&bytes).ok().map(|c| c.exp)
}

fn unavailable(err: reqwest::Error) -> ProviderError {
    warn!(error = %err, "Identity provider request failed");
    ProviderError::Unavailable(err.to_string())
}

/// Statuses that say nothing about the credentials: timeouts, throttling and
/// server faults.
fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

fn server_error(status: StatusCode) -> ProviderError {
    warn!(status = %status, "Identity provider could not serve the request");
    ProviderError::Unavailable(format!("identity provider returned {status}"))
}
