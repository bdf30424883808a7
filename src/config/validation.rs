//! Configuration validation module

use crate::config::{AuthConfig, Config, QuotaConfig, ServerConfig, StoreConfig};

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Server configuration error: {message}")]
    Server { message: String },

    #[error("Authentication configuration error: {message}")]
    Auth { message: String },

    #[error("Quota configuration error: {message}")]
    Quota { message: String },

    #[error("Store configuration error: {message}")]
    Store { message: String },
}

impl ValidationError {
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn quota(message: impl Into<String>) -> Self {
        Self::Quota {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        // u16 cannot exceed 65535, so only 0 needs rejecting
        if self.port == 0 {
            return Err(ValidationError::server(format!(
                "Port must be in range 1-65535, got {}",
                self.port
            )));
        }

        if self.host.is_empty() {
            return Err(ValidationError::server("Host cannot be empty".to_string()));
        }

        if self.request_timeout_seconds == 0 {
            return Err(ValidationError::server(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Validate for AuthConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.jwt_secret.len() < 32 {
            return Err(ValidationError::auth(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        if self.token_ttl_hours == 0 {
            return Err(ValidationError::auth(
                "Token TTL must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Validate for QuotaConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.verified_limit == 0 {
            return Err(ValidationError::quota(
                "Verified limit must be greater than 0".to_string(),
            ));
        }

        if self.verified_limit < self.unverified_limit {
            return Err(ValidationError::quota(format!(
                "Verified limit ({}) must not be below the unverified limit ({})",
                self.verified_limit, self.unverified_limit
            )));
        }

        if self.reset_window_hours == 0 {
            return Err(ValidationError::quota(
                "Reset window must be greater than 0 hours".to_string(),
            ));
        }

        Ok(())
    }
}

impl Validate for StoreConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.io_timeout_seconds == 0 {
            return Err(ValidationError::store(
                "Store I/O timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.auth.validate()?;
        self.quota.validate()?;
        self.store.validate()?;
        Ok(())
    }
}
