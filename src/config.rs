//! Configuration management for the SEO agent service.
//!
//! Configuration can be set via environment variables:
//! - `OPENROUTER_API_KEY` - Optional. Without it every LLM-backed collaborator runs on its fallback.
//! - `DEFAULT_MODEL` - Optional. The LLM model to use. Defaults to `openai/gpt-4o-mini`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `CRITIC_MAX_ITERATIONS` - Optional. Revision budget before the critic forces a pass. Defaults to `3`, at most `20`.
//! - `CRITIC_PASS_THRESHOLD` - Optional. Minimum passing critic score. Defaults to `90`.
//! - `CRITIC_DRAFT_CHAR_LIMIT` - Optional. Draft prefix (in characters) the critic evaluates. Defaults to `4000`.
//! - `AUDIT_TIMEOUT_SECS` - Optional. HTTP timeout for audit fetches. Defaults to `15`.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Tuning for the critic and the revision loop it gates.
#[derive(Debug, Clone)]
pub struct CriticConfig {
    /// Iterations after which the critic stops judging and forces a pass
    pub max_iterations: u32,

    /// Minimum score (0-100) for a draft to pass
    pub pass_threshold: u8,

    /// Only this many leading characters of a draft are sent for evaluation
    pub draft_char_limit: usize,

    /// Score reported on a forced pass
    pub forced_pass_score: u8,

    /// Sampling temperature for evaluation calls
    pub temperature: f64,
}

impl Default for CriticConfig {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            pass_threshold: 90,
            draft_char_limit: 4000,
            forced_pass_score: 70,
            temperature: 0.2,
        }
    }
}

/// Largest accepted `CRITIC_MAX_ITERATIONS`.
pub const MAX_CRITIC_ITERATIONS: u32 = 20;

impl CriticConfig {
    /// Reject values the revision loop cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pass_threshold > 100 {
            return Err(ConfigError::InvalidValue(
                "CRITIC_PASS_THRESHOLD".to_string(),
                format!("{} is above 100", self.pass_threshold),
            ));
        }
        if self.max_iterations > MAX_CRITIC_ITERATIONS {
            return Err(ConfigError::InvalidValue(
                "CRITIC_MAX_ITERATIONS".to_string(),
                format!("{} is above {}", self.max_iterations, MAX_CRITIC_ITERATIONS),
            ));
        }
        Ok(())
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenRouter API key (None = offline mode, collaborators use fallbacks)
    pub api_key: Option<String>,

    /// LLM model identifier (OpenRouter format)
    pub default_model: String,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Critic / revision loop tuning
    pub critic: CriticConfig,

    /// Timeout for audit HTTP fetches
    pub audit_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let default_model = std::env::var("DEFAULT_MODEL")
            .unwrap_or_else(|_| "openai/gpt-4o-mini".to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = parse_env("PORT", 3000u16)?;

        let defaults = CriticConfig::default();
        let critic = CriticConfig {
            max_iterations: parse_env("CRITIC_MAX_ITERATIONS", defaults.max_iterations)?,
            pass_threshold: parse_env("CRITIC_PASS_THRESHOLD", defaults.pass_threshold)?,
            draft_char_limit: parse_env("CRITIC_DRAFT_CHAR_LIMIT", defaults.draft_char_limit)?,
            ..defaults
        };
        critic.validate()?;

        let audit_timeout = Duration::from_secs(parse_env("AUDIT_TIMEOUT_SECS", 15u64)?);

        Ok(Self {
            api_key,
            default_model,
            host,
            port,
            critic,
            audit_timeout,
        })
    }

    /// Create an offline config with default values (useful for testing).
    pub fn new(default_model: impl Into<String>) -> Self {
        Self {
            api_key: None,
            default_model: default_model.into(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            critic: CriticConfig::default(),
            audit_timeout: Duration::from_secs(15),
        }
    }

    /// Whether an LLM credential is configured.
    pub fn llm_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

fn parse_env<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}
