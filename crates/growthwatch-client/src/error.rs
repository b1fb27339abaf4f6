//! Client error type.

use thiserror::Error;

use growthwatch_core::error::{AppError, ErrorKind};

/// Failures surfaced by [`crate::AuthClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured base URL is unusable.
    #[error("invalid base url: {0}")]
    InvalidUrl(String),
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server kept answering `401` after the retry.
    #[error("session expired")]
    SessionExpired,
    /// The server answered with an error status.
    #[error("server returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the error body.
        message: String,
    },
}

impl ClientError {
    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::SessionExpired => Some(401),
            _ => None,
        }
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        let kind = match &err {
            ClientError::InvalidUrl(_) => ErrorKind::Configuration,
            ClientError::Transport(_) => ErrorKind::ServiceUnavailable,
            ClientError::SessionExpired => ErrorKind::Authentication,
            ClientError::Api { status: 400, .. } => ErrorKind::Validation,
            ClientError::Api { status: 401, .. } => ErrorKind::Authentication,
            ClientError::Api { status: 403, .. } => ErrorKind::Authorization,
            ClientError::Api { status: 404, .. } => ErrorKind::NotFound,
            ClientError::Api { status: 503, .. } => ErrorKind::ServiceUnavailable,
            ClientError::Api { .. } => ErrorKind::ExternalService,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}
