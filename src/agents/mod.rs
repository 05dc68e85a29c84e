//! Agents module - the five SEO workflows and the critic that gates content.
//!
//! # Agent Types
//! - **SeoAuditAgent**: page audit partitioned by severity
//! - **ContentCreationAgent**: brief, outline, titles, critic-gated draft, schema
//! - **KeywordResearchAgent**: discovery, long-tail, questions, SERP, clusters
//! - **CompetitiveAnalysisAgent**: own domain vs up to five competitors
//! - **FullStrategyAgent**: concurrent composite of the above
//!
//! # Design Principles
//! - Each agent is a fixed sequence of collaborator calls with one typed output
//! - Collaborator fallbacks live in `services`; an agent only sees errors the
//!   collaborator could not recover from, and propagates them with `?`
//! - The orchestrator's execution unit is the catch boundary for a run; the
//!   strategy composite is the catch boundary for its sub-runs

mod audit;
mod competitive;
mod content;
pub mod critic;
mod keywords;
pub mod revision;
mod strategy;
mod types;

pub use audit::{AuditReport, AuditSummary, Health, SeoAuditAgent};
pub use competitive::{CompetitiveAnalysisAgent, CompetitiveReport, MAX_COMPETITORS};
pub use content::{ContentCreationAgent, ContentReport, RevisedDraft};
pub use critic::{Critic, Critique, CritiqueRound};
pub use keywords::{KeywordReport, KeywordResearchAgent};
pub use revision::{RevisionLoop, RevisionOutcome};
pub use strategy::{priority_actions, FullStrategyAgent, StrategyReport};
pub use types::{
    AgentError, AgentKind, AgentOutput, AgentParams, AuditParams, CompetitiveParams,
    ContentOptions, ContentParams, KeywordOptions, KeywordParams, StrategyParams, SubResult,
};

use std::sync::Arc;

use async_trait::async_trait;

use crate::services::Services;
use crate::task::ProgressLog;

/// Shared context passed to an agent run.
///
/// # Thread Safety
/// Every member is cheap to clone and `Send + Sync`; one context is built per
/// Task and borrowed by the agent for the duration of the run.
#[derive(Clone)]
pub struct AgentContext {
    /// Collaborators the workflows call
    pub services: Services,

    /// Critic gating drafted content
    pub critic: Arc<Critic>,

    /// Sink for human-readable progress lines (the Task's `logs`)
    pub progress: ProgressLog,
}

impl AgentContext {
    pub fn new(services: Services, critic: Arc<Critic>) -> Self {
        Self {
            services,
            critic,
            progress: ProgressLog::detached(),
        }
    }

    /// The same context reporting into `progress`.
    pub fn with_progress(&self, progress: ProgressLog) -> Self {
        Self {
            progress,
            ..self.clone()
        }
    }
}

/// Base trait for all agents.
///
/// # Invariants
/// - `run()` performs its collaborator calls in a fixed, documented order
/// - `run()` returns `Err` only for failures a collaborator did not absorb
///   with a fallback
#[async_trait]
pub trait Agent: Send + Sync {
    /// Validated input for one run.
    type Params: Send + 'static;

    /// Aggregate result of one run.
    type Output: Send;

    /// Execute the workflow.
    ///
    /// # Errors
    /// Returns `AgentError::Service` when a collaborator fails outright.
    async fn run(&self, params: Self::Params, ctx: &AgentContext) -> Result<Self::Output, AgentError>;
}

/// Dispatch typed parameters to the matching agent.
pub async fn run_agent(params: AgentParams, ctx: &AgentContext) -> Result<AgentOutput, AgentError> {
    tracing::debug!(agent = %params.kind(), "Dispatching agent");
    Ok(match params {
        AgentParams::SeoAudit(p) => AgentOutput::SeoAudit(SeoAuditAgent.run(p, ctx).await?),
        AgentParams::ContentCreation(p) => {
            AgentOutput::ContentCreation(ContentCreationAgent.run(p, ctx).await?)
        }
        AgentParams::KeywordResearch(p) => {
            AgentOutput::KeywordResearch(KeywordResearchAgent.run(p, ctx).await?)
        }
        AgentParams::CompetitiveAnalysis(p) => {
            AgentOutput::CompetitiveAnalysis(CompetitiveAnalysisAgent.run(p, ctx).await?)
        }
        AgentParams::FullSeoStrategy(p) => {
            AgentOutput::FullSeoStrategy(FullStrategyAgent.run(p, ctx).await?)
        }
    })
}


#[cfg(test)]
mod tests {
    use super::testing::context;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_dispatch_matches_kind() {
        let ctx = context();
        for (agent_type, params) in [
            ("seo_audit", json!({"url": "example.com"})),
            ("keyword_research", json!({"seed_keyword": "tea"})),
            ("competitive_analysis", json!({"your_domain": "a.com", "competitors": ["b.com"]})),
        ] {
            let parsed = AgentParams::parse(agent_type, params).unwrap();
            let kind = parsed.kind();
            let output = run_agent(parsed, &ctx).await.unwrap();
            assert!(output.critic_history().is_none(), "{}", kind);
            assert!(output.to_value().unwrap().is_object());
        }
    }

    #[tokio::test]
    async fn test_content_output_exposes_critic_history() {
        let params = AgentParams::parse(
            "content_creation",
            json!({"topic": "Tea", "keyword": "green tea"}),
        )
        .unwrap();
        let output = run_agent(params, &context()).await.unwrap();
        let history = output.critic_history().expect("draft was generated");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].score, 95);
    }
}
