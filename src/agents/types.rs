//! Core types for the agent system.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::audit::AuditReport;
use super::competitive::CompetitiveReport;
use super::content::ContentReport;
use super::critic::CritiqueRound;
use super::keywords::KeywordReport;
use super::strategy::StrategyReport;
use crate::services::ServiceError;
use crate::util::null_as_default;

/// The five workflows an orchestrated task can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    SeoAudit,
    ContentCreation,
    KeywordResearch,
    CompetitiveAnalysis,
    FullSeoStrategy,
}

impl AgentKind {
    pub const ALL: [AgentKind; 5] = [
        AgentKind::SeoAudit,
        AgentKind::ContentCreation,
        AgentKind::KeywordResearch,
        AgentKind::CompetitiveAnalysis,
        AgentKind::FullSeoStrategy,
    ];

    /// Wire name, as accepted by `start_task`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::SeoAudit => "seo_audit",
            AgentKind::ContentCreation => "content_creation",
            AgentKind::KeywordResearch => "keyword_research",
            AgentKind::CompetitiveAnalysis => "competitive_analysis",
            AgentKind::FullSeoStrategy => "full_seo_strategy",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AgentError::UnknownAgentType(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditParams {
    pub url: String,
    #[serde(default)]
    pub options: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentOptions {
    /// Draft an article and run it through the critic
    pub generate_content: bool,
    pub word_count: u32,
}

impl Default for ContentOptions {
    fn default() -> Self {
        Self {
            generate_content: true,
            word_count: 1500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentParams {
    pub topic: String,
    pub keyword: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: ContentOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordOptions {
    /// Upper bound on discovered keywords
    pub limit: usize,
}

impl Default for KeywordOptions {
    fn default() -> Self {
        Self { limit: 50 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordParams {
    pub seed_keyword: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: KeywordOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitiveParams {
    pub your_domain: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub competitors: Vec<String>,
    #[serde(default)]
    pub options: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyParams {
    pub domain: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_keywords: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub competitors: Vec<String>,
}

/// Typed parameters, one variant per agent.
#[derive(Debug, Clone)]
pub enum AgentParams {
    SeoAudit(AuditParams),
    ContentCreation(ContentParams),
    KeywordResearch(KeywordParams),
    CompetitiveAnalysis(CompetitiveParams),
    FullSeoStrategy(StrategyParams),
}

impl AgentParams {
    /// Resolve a caller's `(agent_type, params)` pair.
    ///
    /// # Errors
    /// - `UnknownAgentType` if `agent_type` names no agent
    /// - `InvalidParams` if `params` lacks a required field or has a wrong type
    pub fn parse(agent_type: &str, params: Value) -> Result<Self, AgentError> {
        let kind: AgentKind = agent_type.parse()?;
        let invalid = |e: serde_json::Error| AgentError::InvalidParams {
            agent: kind,
            message: e.to_string(),
        };
        Ok(match kind {
            AgentKind::SeoAudit => Self::SeoAudit(serde_json::from_value(params).map_err(invalid)?),
            AgentKind::ContentCreation => {
                Self::ContentCreation(serde_json::from_value(params).map_err(invalid)?)
            }
            AgentKind::KeywordResearch => {
                Self::KeywordResearch(serde_json::from_value(params).map_err(invalid)?)
            }
            AgentKind::CompetitiveAnalysis => {
                Self::CompetitiveAnalysis(serde_json::from_value(params).map_err(invalid)?)
            }
            AgentKind::FullSeoStrategy => {
                Self::FullSeoStrategy(serde_json::from_value(params).map_err(invalid)?)
            }
        })
    }

    pub fn kind(&self) -> AgentKind {
        match self {
            Self::SeoAudit(_) => AgentKind::SeoAudit,
            Self::ContentCreation(_) => AgentKind::ContentCreation,
            Self::KeywordResearch(_) => AgentKind::KeywordResearch,
            Self::CompetitiveAnalysis(_) => AgentKind::CompetitiveAnalysis,
            Self::FullSeoStrategy(_) => AgentKind::FullSeoStrategy,
        }
    }
}

/// Result of one agent run.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AgentOutput {
    SeoAudit(AuditReport),
    ContentCreation(ContentReport),
    KeywordResearch(KeywordReport),
    CompetitiveAnalysis(CompetitiveReport),
    FullSeoStrategy(StrategyReport),
}

impl AgentOutput {
    /// Critique rounds, when the run drafted content through the critic.
    pub fn critic_history(&self) -> Option<&[CritiqueRound]> {
        match self {
            AgentOutput::ContentCreation(report) => report
                .content
                .as_ref()
                .map(|draft| draft.critic_history.as_slice()),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Result<Value, AgentError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Outcome of a sub-agent inside a composite run: the result, or an error
/// marker standing in for it.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SubResult<T> {
    Ok(T),
    Error { error: String },
}

impl<T> SubResult<T> {
    pub fn error(message: impl Into<String>) -> Self {
        SubResult::Error {
            error: message.into(),
        }
    }

    pub fn ok(&self) -> Option<&T> {
        match self {
            SubResult::Ok(value) => Some(value),
            SubResult::Error { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SubResult::Error { .. })
    }
}

/// Errors from agent execution.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Unknown agent type: {0}")]
    UnknownAgentType(String),

    #[error("Invalid parameters for {agent}: {message}")]
    InvalidParams { agent: AgentKind, message: String },

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
