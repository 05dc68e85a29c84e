//! Chat-completion access for the critic and the LLM-backed collaborators.
//!
//! [`OpenRouterClient`] talks to the network; [`DisabledClient`] stands in
//! when no credential is configured.
//!
//! Collaborators never call the client directly for structured data; they go
//! through [`structured::complete_json`] so every prompt-driven call shares the
//! same parse-or-fallback behavior.

mod disabled;
mod error;
mod openrouter;
pub mod structured;

pub use disabled::DisabledClient;
pub use error::{LlmError, LlmErrorKind};
pub use openrouter::{OpenRouterClient, RetryPolicy};

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::Config;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One turn of the prompt sent to the model.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// What came back from one completion call.
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    /// `None` when the provider returned no message body
    pub content: Option<String>,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt: u64,
    pub completion: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.prompt.saturating_add(self.completion)
    }
}

/// Sampling knobs; `None` leaves the provider default.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u64>,
}

impl ChatOptions {
    pub fn max_tokens(max_tokens: u64) -> Self {
        Self {
            temperature: None,
            max_tokens: Some(max_tokens),
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A chat-completion provider.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: ChatOptions,
    ) -> anyhow::Result<ChatResponse>;
}

/// Build the client for the given configuration.
///
/// Without an API key this is a [`DisabledClient`]; every call fails fast and
/// collaborators fall back to their documented defaults.
pub fn client_from_config(config: &Config) -> Arc<dyn LlmClient> {
    match &config.api_key {
        Some(key) => Arc::new(OpenRouterClient::new(key.clone())),
        None => {
            tracing::warn!("OPENROUTER_API_KEY not set; LLM collaborators will use fallbacks");
            Arc::new(DisabledClient)
        }
    }
}
