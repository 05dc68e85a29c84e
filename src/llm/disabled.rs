//! Client used when no LLM credential is configured.

use async_trait::async_trait;

use super::{ChatMessage, ChatOptions, ChatResponse, LlmClient, LlmError};

/// Always fails with [`LlmErrorKind::Unconfigured`](super::LlmErrorKind).
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledClient;

#[async_trait]
impl LlmClient for DisabledClient {
    async fn chat_completion(
        &self,
        _model: &str,
        _messages: &[ChatMessage],
        _options: ChatOptions,
    ) -> anyhow::Result<ChatResponse> {
        Err(LlmError::unconfigured().into())
    }
}
