//! Chat proxy domain: message types, the upstream client trait, and errors
//!
//! The gate sits in front of a single guarded endpoint that forwards the
//! conversation to an AI chat-completions API and returns its reply verbatim.
//! No inference logic lives here.

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Message role in a chat conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(ChatRole::System),
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            other => Err(format!("Unknown chat role: {}", other)),
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRole::System => write!(f, "system"),
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in the conversation forwarded upstream
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Upstream AI call error
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Upstream authentication failed: {0}")]
    Authentication(String),

    #[error("Upstream rate limited: {message}")]
    RateLimited {
        retry_after: Option<u64>,
        message: String,
    },

    #[error("Upstream request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Upstream network error: {0}")]
    Network(String),

    #[error("Upstream service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Upstream returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("Upstream client misconfigured: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout { seconds: 0 }
        } else if err.is_connect() {
            UpstreamError::Network(format!("Connection failed: {}", err))
        } else {
            UpstreamError::Network(err.to_string())
        }
    }
}

/// Client for the upstream chat-completions API.
///
/// Implementations forward the conversation and return the assistant's reply
/// text. Retries belong to the caller's collaborators, never to the gate.
#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, UpstreamError>;
}
