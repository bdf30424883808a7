//! OpenAI-compatible chat-completions client
//!
//! Works with OpenAI and any OpenAI-compatible API. The gate forwards the
//! conversation as-is and returns the assistant reply verbatim.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::config::UpstreamConfig;
use crate::domain::chat::{ChatCompletionClient, ChatMessage, UpstreamError};

/// OpenAI-compatible chat-completions client
pub struct OpenAIChatClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: Option<u32>,
    timeout_seconds: u64,
}

impl OpenAIChatClient {
    pub fn new(config: &UpstreamConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|e| {
                error!(error = %e, "Failed to build HTTP client with custom timeout, using default client");
                Client::new()
            });

        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout_seconds: config.timeout_seconds,
        }
    }

    /// Get the chat completions URL
    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn to_request(&self, messages: &[ChatMessage]) -> OpenAIRequest {
        OpenAIRequest {
            model: self.model.clone(),
            messages: messages
                .iter()
                .map(|msg| OpenAIMessage {
                    role: msg.role.to_string(),
                    content: Some(msg.content.clone()),
                })
                .collect(),
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl ChatCompletionClient for OpenAIChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, UpstreamError> {
        if self.api_key.trim().is_empty() {
            return Err(UpstreamError::Configuration(
                "upstream.api_key is not configured".to_string(),
            ));
        }

        let request = self.to_request(messages);

        debug!(model = %request.model, messages = request.messages.len(), "Forwarding chat request upstream");

        let response = self
            .client
            .post(self.chat_url())
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UpstreamError::Timeout {
                        seconds: self.timeout_seconds,
                    }
                } else {
                    UpstreamError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(UpstreamError::RateLimited {
                    retry_after: None,
                    message: text,
                });
            } else if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(UpstreamError::Authentication(text));
            } else if status.as_u16() >= 500 {
                return Err(UpstreamError::ServiceUnavailable(text));
            }

            error!(status = %status, "Upstream API error: {}", text);
            return Err(UpstreamError::InvalidResponse(format!(
                "API error {}: {}",
                status, text
            )));
        }

        let response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                UpstreamError::InvalidResponse("response contained no assistant message".to_string())
            })
    }
}

// === OpenAI API Types ===

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: Option<OpenAIMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::ChatRole;

    fn test_config() -> UpstreamConfig {
        UpstreamConfig {
            api_key: "test-key".to_string(),
            base_url: "https://api.openai.com/v1/".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_seconds: 120,
            max_tokens: Some(1024),
        }
    }

    #[test]
    fn test_chat_url() {
        let client = OpenAIChatClient::new(&test_config());
        assert_eq!(
            client.chat_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_shape() {
        let client = OpenAIChatClient::new(&test_config());
        let messages = vec![
            ChatMessage::new(ChatRole::System, "You are a legal assistant."),
            ChatMessage::new(ChatRole::User, "What is consideration?"),
        ];

        let request = client.to_request(&messages);
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].role, "user");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let mut config = test_config();
        config.api_key = "".to_string();
        let client = OpenAIChatClient::new(&config);

        let result = client
            .complete(&[ChatMessage::new(ChatRole::User, "hi")])
            .await;
        assert!(matches!(result, Err(UpstreamError::Configuration(_))));
    }
}
