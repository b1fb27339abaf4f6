//! JWT token creation with configurable signing and TTL.

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use growthwatch_core::config::AuthConfig;
use growthwatch_core::error::AppError;

use super::claims::{Claims, TokenType};

/// Creates signed JWT access and refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    access_ttl_minutes: i64,
    refresh_ttl_hours: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("refresh_ttl_hours", &self.refresh_ttl_hours)
            .finish()
    }
}

/// A freshly signed token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token expiry (seconds since epoch).
    pub access_expires_at: i64,
    /// Refresh token expiry (seconds since epoch).
    pub refresh_expires_at: i64,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl_minutes: i64::try_from(config.jwt_access_ttl_minutes)
                .unwrap_or(i64::MAX / 60),
            refresh_ttl_hours: i64::try_from(config.jwt_refresh_ttl_hours)
                .unwrap_or(i64::MAX / 3600),
        }
    }

    /// Refresh token lifetime in seconds.
    pub fn refresh_ttl_seconds(&self) -> u64 {
        u64::try_from(self.refresh_ttl_hours * 3600).unwrap_or(0)
    }

    /// Generates an access + refresh token pair for the given identity and session.
    pub fn generate_token_pair(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        email: Option<&str>,
    ) -> Result<TokenPair, AppError> {
        let now = Utc::now().timestamp();
        let access_exp = now + self.access_ttl_minutes * 60;
        let refresh_exp = now + self.refresh_ttl_hours * 3600;

        let access_claims =
            self.claims(user_id, session_id, email, now, access_exp, TokenType::Access);
        let refresh_claims =
            self.claims(user_id, session_id, email, now, refresh_exp, TokenType::Refresh);

        Ok(TokenPair {
            access_token: self.sign(&access_claims)?,
            refresh_token: self.sign(&refresh_claims)?,
            access_expires_at: access_exp,
            refresh_expires_at: refresh_exp,
        })
    }

    /// Signs arbitrary claims. Used to mint tokens with a chosen expiry.
    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))
    }

    fn claims(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        email: Option<&str>,
        iat: i64,
        exp: i64,
        token_type: TokenType,
    ) -> Claims {
        Claims {
            sub: user_id,
            sid: session_id,
            email: email.map(str::to_string),
            iat,
            exp,
            jti: Uuid::new_v4(),
            token_type,
        }
    }
}
