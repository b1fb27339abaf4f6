//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request body.
///
/// Fields default to empty so a missing field fails validation with `400`
/// instead of a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Sign-in email.
    #[serde(default)]
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub email: String,
    /// Password.
    #[serde(default)]
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub password: String,
}

impl LoginRequest {
    /// Trims the email; passwords are taken verbatim.
    pub fn normalized(mut self) -> Self {
        self.email = self.email.trim().to_string();
        self
    }
}
