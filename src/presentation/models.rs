//! API request and response models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::chat::{ChatMessage, ChatRole};

/// Standard error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    #[schema(example = "GUEST_LIMIT_EXHAUSTED")]
    pub code: String,

    /// Human-readable error message
    #[schema(example = "Guest limit reached. Please sign up and log in to make more queries.")]
    pub message: String,

    /// Additional error context
    pub details: Option<serde_json::Value>,

    /// Unique request identifier for tracking and support
    pub request_id: Uuid,

    /// Error occurrence timestamp
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// One message in the submitted conversation
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ChatMessageDto {
    /// Message role: "system", "user", or "assistant"
    #[schema(example = "user")]
    pub role: String,
    /// Message text
    #[schema(example = "What is the limitation period for a civil suit?")]
    pub content: String,
}

/// Request model for the guarded chat endpoint
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// Full conversation history, oldest first
    pub messages: Vec<ChatMessageDto>,
}

impl ChatRequest {
    /// Convert to domain messages, rejecting unknown roles and empty content
    pub fn to_domain(&self) -> Result<Vec<ChatMessage>, String> {
        if self.messages.is_empty() {
            return Err("At least one message is required".to_string());
        }

        self.messages
            .iter()
            .map(|m| {
                if m.content.trim().is_empty() {
                    return Err("Message content cannot be empty".to_string());
                }
                let role = ChatRole::from_str(&m.role)?;
                Ok(ChatMessage::new(role, m.content.clone()))
            })
            .collect()
    }
}

/// Response model for the guarded chat endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    /// Assistant reply, passed through from the upstream API verbatim
    pub result: String,
}

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall service health status
    #[schema(example = "healthy")]
    pub status: String,

    /// Current service version
    #[schema(example = "0.3.0")]
    pub version: String,

    /// Response timestamp
    pub timestamp: DateTime<Utc>,
}
