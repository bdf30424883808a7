//! JWT service for token generation and validation

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::sync::Arc;

use crate::domain::auth::{
    errors::AuthError,
    value_objects::{AccountId, AuthClaims, Email},
};

/// JWT service for generating and validating signed bearer tokens.
///
/// Tokens are signed with a shared secret and carry a fixed validity window;
/// expiry is enforced by signature validation, not by the store.
#[derive(Clone)]
pub struct JwtService {
    /// Secret key for signing tokens
    secret: Arc<String>,
    /// Token TTL in hours
    token_ttl_hours: u64,
}

impl JwtService {
    /// Create a new JWT service
    pub fn new(secret: String, token_ttl_hours: u64) -> Self {
        Self {
            secret: Arc::new(secret),
            token_ttl_hours,
        }
    }

    /// Generate a signed token for an account
    pub fn generate_token(&self, account_id: AccountId, email: Email) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.token_ttl_hours as i64);

        let claims = AuthClaims::new(
            account_id,
            email,
            exp.timestamp() as usize,
            now.timestamp() as usize,
        );

        let header = Header::default();
        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());

        encode(&header, &claims, &encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT token: {}", e);
            AuthError::InvalidToken
        })
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<AuthClaims, AuthError> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        decode::<AuthClaims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken,
                }
            })
    }
}
