//! OpenRouter chat-completions client (OpenAI-compatible wire format).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::LlmError;
use super::{ChatMessage, ChatOptions, ChatResponse, LlmClient, TokenUsage};

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// When to give up on transient failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Total time budget across all attempts
    pub budget: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            budget: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt, or `None` to give up.
    pub fn next_delay(&self, error: &LlmError, attempt: u32, elapsed: Duration) -> Option<Duration> {
        if !error.is_transient() || attempt >= self.max_retries {
            return None;
        }
        let delay = error.backoff(attempt).min(self.budget.saturating_sub(elapsed));
        (!delay.is_zero()).then_some(delay)
    }
}

pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    retry: RetryPolicy,
}

impl OpenRouterClient {
    pub fn new(api_key: String) -> Self {
        Self::with_retry_policy(api_key, RetryPolicy::default())
    }

    pub fn with_retry_policy(api_key: String, retry: RetryPolicy) -> Self {
        Self {
            client: Client::new(),
            api_key,
            retry,
        }
    }

    async fn send_once(&self, request: &CompletionRequest<'_>) -> Result<ChatResponse, LlmError> {
        let response = self
            .client
            .post(OPENROUTER_API_URL)
            .bearer_auth(&self.api_key)
            .header("X-Title", "seo-agents")
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::network_error(e.to_string()))?;

        let status = response.status();
        let retry_after = retry_after(response.headers());
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network_error(e.to_string()))?;

        if !status.is_success() {
            return Err(LlmError::from_status(status.as_u16(), body, retry_after));
        }
        parse_completion(&body, request.model)
    }
}

/// `Retry-After` in seconds, if present.
fn retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
        .map(Duration::from_secs)
}

fn parse_completion(body: &str, requested_model: &str) -> Result<ChatResponse, LlmError> {
    let parsed: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::parse_error(format!("Malformed completion ({}): {}", e, body)))?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::parse_error("Completion has no choices"))?;

    let usage = parsed.usage.map(|u| TokenUsage {
        prompt: u.prompt_tokens,
        completion: u.completion_tokens,
    });
    if let Some(usage) = usage {
        tracing::debug!(
            model = parsed.model.as_deref().unwrap_or(requested_model),
            finish_reason = choice.finish_reason.as_deref().unwrap_or("unknown"),
            tokens = usage.total(),
            "Completion received"
        );
    }
    Ok(ChatResponse {
        content: choice.message.content,
        usage,
    })
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: ChatOptions,
    ) -> anyhow::Result<ChatResponse> {
        let request = CompletionRequest {
            model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };
        let started = Instant::now();

        for attempt in 0.. {
            let error = match self.send_once(&request).await {
                Ok(response) => return Ok(response),
                Err(error) => error,
            };
            let Some(delay) = self.retry.next_delay(&error, attempt, started.elapsed()) else {
                tracing::warn!(model, attempts = attempt + 1, error = %error, "Completion failed");
                return Err(error.into());
            };
            tracing::debug!(model, attempt, ?delay, error = %error, "Retrying completion");
            tokio::time::sleep(delay).await;
        }
        unreachable!("retry loop only exits by returning")
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
