//! Structured completions with a uniform fallback path.
//!
//! Every prompt-driven collaborator asks the model for JSON, extracts it from
//! the reply (raw or inside a markdown fence), deserializes it into a typed
//! value, and on *any* failure substitutes a documented default. The failure
//! is logged and never propagated.

use serde::de::DeserializeOwned;

use super::{ChatMessage, ChatOptions, LlmClient, LlmError};
use crate::util::extract_json;

/// Send `messages` and deserialize the JSON found in the reply into `T`.
///
/// # Errors
/// - the client call failed (network, auth, rate limit after retries)
/// - the reply was empty
/// - no JSON could be extracted, or it did not match `T`
pub async fn complete_json<T: DeserializeOwned>(
    llm: &dyn LlmClient,
    model: &str,
    messages: &[ChatMessage],
    options: ChatOptions,
) -> Result<T, LlmError> {
    let text = complete_text(llm, model, messages, options).await?;
    let value = extract_json(&text)
        .ok_or_else(|| LlmError::parse_error(format!("No JSON found in reply: {}", preview(&text))))?;
    serde_json::from_value(value)
        .map_err(|e| LlmError::parse_error(format!("Unexpected JSON shape: {}", e)))
}

/// Send `messages` and return the reply text.
pub async fn complete_text(
    llm: &dyn LlmClient,
    model: &str,
    messages: &[ChatMessage],
    options: ChatOptions,
) -> Result<String, LlmError> {
    let response = llm
        .chat_completion(model, messages, options)
        .await
        .map_err(into_llm_error)?;

    response
        .content
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| LlmError::parse_error("Empty completion".to_string()))
}

/// Resolve a structured call, substituting `fallback` on failure.
pub fn or_fallback<T>(result: Result<T, LlmError>, what: &str, fallback: impl FnOnce() -> T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(call = what, error = %e, "LLM call failed, using fallback");
            fallback()
        }
    }
}

fn into_llm_error(error: anyhow::Error) -> LlmError {
    match error.downcast::<LlmError>() {
        Ok(llm_error) => llm_error,
        Err(other) => LlmError::network_error(other.to_string()),
    }
}

fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}
