//! Chat submission use case

use std::sync::Arc;

use crate::domain::chat::{ChatCompletionClient, ChatMessage, UpstreamError};

/// Use case forwarding an admitted conversation to the upstream AI API.
///
/// The response passes through verbatim; no retries happen here.
pub struct SubmitChatUseCase {
    client: Arc<dyn ChatCompletionClient>,
}

impl SubmitChatUseCase {
    pub fn new(client: Arc<dyn ChatCompletionClient>) -> Self {
        Self { client }
    }

    pub async fn execute(&self, messages: &[ChatMessage]) -> Result<String, UpstreamError> {
        self.client.complete(messages).await
    }
}
