//! Configuration management

pub mod validation;

pub use validation::{Validate, ValidationError};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::quota::QuotaPolicy;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub quota: QuotaConfig,
    pub store: StoreConfig,
    pub mail: MailConfig,
    pub upstream: UpstreamConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
    pub enable_docs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout_seconds: 120,
            enable_docs: true,
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JWT secret key for signing tokens (must be at least 32 characters in production)
    pub jwt_secret: String,
    /// Token TTL in hours
    pub token_ttl_hours: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production-use-strong-random-secret-key".to_string(),
            token_ttl_hours: 168, // 7 days
        }
    }
}

/// Quota tier configuration
///
/// Anonymous and unverified callers share a low ceiling; verified accounts
/// get the higher ceiling and the only time-based reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    pub guest_limit: u32,
    pub unverified_limit: u32,
    pub verified_limit: u32,
    pub reset_window_hours: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            guest_limit: 2,
            unverified_limit: 2,
            verified_limit: 10,
            reset_window_hours: 24,
        }
    }
}

impl QuotaConfig {
    /// Build the runtime quota policy
    pub fn to_policy(&self) -> QuotaPolicy {
        QuotaPolicy {
            guest_limit: self.guest_limit,
            unverified_limit: self.unverified_limit,
            verified_limit: self.verified_limit,
            reset_window: chrono::Duration::hours(self.reset_window_hours as i64),
        }
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Durable single-file JSON store (default)
    #[default]
    JsonFile,
    /// In-memory storage (suitable for development/tests)
    Memory,
}

/// Persistent store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub path: PathBuf,
    pub io_timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::JsonFile,
            path: PathBuf::from("data/store.json"),
            io_timeout_seconds: 5,
        }
    }
}

/// Verification mail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// When disabled, verification emails are logged instead of sent
    pub enabled: bool,
    pub api_key: String,
    pub sender_email: String,
    pub sender_name: String,
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Base URL used to build verification links sent to users
    pub public_base_url: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            sender_email: "no-reply@jurisai.example".to_string(),
            sender_name: "JurisAI".to_string(),
            base_url: "https://api.brevo.com".to_string(),
            timeout_seconds: 10,
            public_base_url: "http://localhost:3000".to_string(),
        }
    }
}

/// Upstream chat-completions API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub max_tokens: Option<u32>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_seconds: 120,
            max_tokens: Some(1024),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        // Add environment-specific config if ENV is set
        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        // Add local config and environment variables last (highest priority)
        builder = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("JURISAI").separator("__"));

        let mut config: Config = builder.build()?.try_deserialize()?;

        // Common convention overrides for secrets
        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            config.upstream.api_key = api_key;
        }
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            config.auth.jwt_secret = secret;
        }

        config.validate()?;

        Ok(config)
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_quota_ladder() {
        let config = QuotaConfig::default();
        assert_eq!(config.guest_limit, 2);
        assert_eq!(config.unverified_limit, 2);
        assert_eq!(config.verified_limit, 10);
        assert_eq!(config.reset_window_hours, 24);
    }

    #[test]
    fn test_policy_conversion() {
        let policy = QuotaConfig::default().to_policy();
        assert_eq!(policy.reset_window, chrono::Duration::hours(24));
    }

    #[test]
    fn test_default_token_ttl_is_seven_days() {
        assert_eq!(AuthConfig::default().token_ttl_hours, 168);
    }
}
