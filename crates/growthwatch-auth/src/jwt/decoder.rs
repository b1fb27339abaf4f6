//! JWT token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use thiserror::Error;

use growthwatch_core::config::AuthConfig;

use super::claims::{Claims, TokenType};

/// Why a token failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signature is valid but `exp` has passed.
    #[error("token has expired")]
    Expired,
    /// Token is malformed or its signature does not verify.
    #[error("invalid token: {0}")]
    Invalid(String),
    /// An access token was presented where a refresh token was expected, or vice versa.
    #[error("unexpected token type")]
    WrongType,
}

/// Validates JWT tokens signed by [`super::JwtEncoder`].
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        expect_type(self.decode_token(token, &self.validation)?, TokenType::Access)
    }

    /// Decodes and validates a refresh token.
    pub fn decode_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        expect_type(self.decode_token(token, &self.validation)?, TokenType::Refresh)
    }

    /// Decodes an access token without checking `exp`.
    ///
    /// Sign-out must still be able to revoke a session whose access token
    /// has already lapsed.
    pub fn decode_access_token_ignoring_expiry(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = self.validation.clone();
        validation.validate_exp = false;
        expect_type(self.decode_token(token, &validation)?, TokenType::Access)
    }

    fn decode_token(&self, token: &str, validation: &Validation) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

fn expect_type(claims: Claims, expected: TokenType) -> Result<Claims, TokenError> {
    if claims.token_type == expected {
        Ok(claims)
    } else {
        Err(TokenError::WrongType)
    }
}
