//! Authentication DTOs for API requests and responses

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Signup request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    /// Account email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Account password
    #[schema(example = "secure_password_123")]
    pub password: String,
}

/// Login request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Account email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Account password
    #[schema(example = "secure_password_123")]
    pub password: String,
}

/// Token response DTO
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Signed bearer token
    pub token: String,
    /// Token type
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token validity in seconds
    #[schema(example = 604800)]
    pub expires_in: u64,
}

/// Query parameters for the verification-consumption endpoint
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyParams {
    /// Single-use verification token from the emailed link
    pub token: String,
}
