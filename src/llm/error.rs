//! LLM error type with retry classification.

use std::time::Duration;

use thiserror::Error;

/// Longest wait between two attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// What went wrong with a completion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LlmErrorKind {
    /// 429
    #[error("Rate limited")]
    RateLimited,
    /// 5xx
    #[error("Server error")]
    ServerError,
    /// Other 4xx (bad request, auth, unknown model)
    #[error("Client error")]
    ClientError,
    /// Connect failure or timeout
    #[error("Network error")]
    NetworkError,
    /// Reply missing, empty, or not the expected shape
    #[error("Parse error")]
    ParseError,
    /// No credential configured
    #[error("LLM not configured")]
    Unconfigured,
}

impl LlmErrorKind {
    /// Worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmErrorKind::RateLimited | LlmErrorKind::ServerError | LlmErrorKind::NetworkError
        )
    }

    /// First backoff step for this kind.
    fn base_delay(&self) -> Duration {
        match self {
            LlmErrorKind::RateLimited => Duration::from_secs(5),
            LlmErrorKind::ServerError => Duration::from_secs(2),
            _ => Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Error)]
#[error("{kind}{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub status: Option<u16>,
    pub message: String,
    /// Server-requested wait (`Retry-After`)
    pub retry_after: Option<Duration>,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            retry_after: None,
        }
    }

    /// Classify a non-success HTTP response.
    pub fn from_status(status: u16, body: impl Into<String>, retry_after: Option<Duration>) -> Self {
        let kind = match status {
            429 => LlmErrorKind::RateLimited,
            400..=499 => LlmErrorKind::ClientError,
            _ => LlmErrorKind::ServerError,
        };
        Self {
            kind,
            status: Some(status),
            message: body.into(),
            retry_after: retry_after.filter(|_| kind == LlmErrorKind::RateLimited),
        }
    }

    pub fn network_error(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::NetworkError, message)
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::ParseError, message)
    }

    pub fn unconfigured() -> Self {
        Self::new(LlmErrorKind::Unconfigured, "no LLM API key configured")
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }

    /// Wait before attempt `attempt + 1`: the server's `Retry-After` if
    /// given, else exponential backoff from the kind's base delay.
    pub fn backoff(&self, attempt: u32) -> Duration {
        if let Some(wait) = self.retry_after {
            return wait.min(MAX_BACKOFF);
        }
        self.kind
            .base_delay()
            .checked_mul(2u32.saturating_pow(attempt))
            .map_or(MAX_BACKOFF, |delay| delay.min(MAX_BACKOFF))
    }
}
