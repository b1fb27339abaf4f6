//! Cookie-aware client for the session API.

use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use growthwatch_core::config::MonitorConfig;

use crate::error::ClientError;
use crate::event::SessionEvent;
use crate::retry::RetryPolicy;
use crate::types::{ErrorBody, SessionStatus, UserEnvelope, UserSummary};

/// Capacity of the session event channel.
const EVENT_CAPACITY: usize = 32;

/// HTTP client that carries the session cookies between requests.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
    events: broadcast::Sender<SessionEvent>,
}

impl AuthClient {
    /// Creates a client for the server at `base_url`.
    pub fn new(base_url: &str, config: &MonitorConfig) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidUrl(base_url));
        }

        let http = Client::builder()
            .user_agent(format!("growthwatch-client/{}", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            http,
            base_url,
            retry: RetryPolicy::new(Duration::from_millis(config.retry_delay_ms)),
            events,
        })
    }

    /// Replaces the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Subscribes to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Publishes a session event. Having no subscribers is not an error.
    pub(crate) fn publish(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    /// Signs in; the server sets the session cookies.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserSummary, ClientError> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let envelope: UserEnvelope = decode(response).await?;
        Ok(envelope.user)
    }

    /// Signs out and drops the session cookies.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let response = self.http.post(self.url("/api/auth/logout")).send().await?;
        decode::<serde_json::Value>(response).await.map(|_| ())
    }

    /// Asks the server whether the session is still valid.
    ///
    /// An invalid session is an answer, not an error.
    pub async fn session(&self) -> Result<SessionStatus, ClientError> {
        let response = self.http.get(self.url("/api/auth/session")).send().await?;
        session_status(response).await
    }

    /// Asks the server to refresh the session now.
    pub async fn refresh(&self) -> Result<SessionStatus, ClientError> {
        let response = self.http.post(self.url("/api/auth/refresh")).send().await?;
        session_status(response).await
    }

    /// Profile of the signed-in admin.
    pub async fn me(&self) -> Result<UserSummary, ClientError> {
        let envelope: UserEnvelope = self.get_json("/api/auth/me").await?;
        Ok(envelope.user)
    }

    /// `GET` a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send_with_retry::<(), T>(Method::GET, path, None).await
    }

    /// `POST` a JSON body.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_with_retry(Method::POST, path, Some(body)).await
    }

    /// `PUT` a JSON body.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_with_retry(Method::PUT, path, Some(body)).await
    }

    /// `DELETE` a resource.
    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send_with_retry::<(), T>(Method::DELETE, path, None).await
    }

    async fn send_with_retry<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut attempt = 0;
        loop {
            let mut request = self.http.request(method.clone(), self.url(path));
            if let Some(body) = body {
                request = request.json(body);
            }
            let response = request.send().await?;
            let status = response.status();

            if status != StatusCode::UNAUTHORIZED {
                return decode(response).await;
            }

            self.publish(SessionEvent::Unauthorized);
            if !self.retry.should_retry(attempt, status) {
                warn!(path, attempts = attempt + 1, "Request still unauthorized");
                return Err(ClientError::SessionExpired);
            }

            attempt += 1;
            debug!(
                path,
                delay_ms = self.retry.delay().as_millis() as u64,
                "Retrying unauthorized request"
            );
            tokio::time::sleep(self.retry.delay()).await;
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn session_status(response: Response) -> Result<SessionStatus, ClientError> {
    match response.status() {
        StatusCode::OK | StatusCode::UNAUTHORIZED => Ok(response.json().await?),
        _ => Err(api_error(response).await),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    if response.status().is_success() {
        Ok(response.json().await?)
    } else {
        Err(api_error(response).await)
    }
}

async fn api_error(response: Response) -> ClientError {
    let status = response.status();
    let body: ErrorBody = response.json().await.unwrap_or_default();
    ClientError::Api {
        status: status.as_u16(),
        message: body
            .message
            .or(body.error)
            .unwrap_or_else(|| status.to_string()),
    }
}
