//! Analysis collaborators.
//!
//! Each collaborator is a trait so agents can be driven by the production
//! implementations (LLM-backed engines, the HTTP auditor) or by test doubles.
//!
//! # Contract
//! - Collaborators never mutate shared state and are safe to call concurrently
//! - LLM-backed implementations never return `Err` for an unavailable or
//!   malformed model reply; they substitute a documented fallback instead
//! - `Err` is reserved for failures the caller must see (e.g. an unparsable
//!   audit URL)

mod aeo;
mod audit;
mod competitive;
mod content;
mod keywords;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use aeo::LlmAeoAnalyzer;
pub use audit::HttpSeoAuditor;
pub use competitive::LlmCompetitiveIntel;
pub use content::LlmContentEngine;
pub use keywords::LlmKeywordEngine;
pub use types::*;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::Config;
use crate::llm::structured::{complete_json, complete_text};
use crate::llm::{ChatMessage, ChatOptions, LlmClient, LlmError};

/// Errors surfaced by collaborators.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL '{0}': {1}")]
    InvalidUrl(String, url::ParseError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Technical, on-page and schema audit of a single page.
#[async_trait]
pub trait SeoAuditor: Send + Sync {
    async fn full_audit(&self, url: &str) -> ServiceResult<AuditResult>;
}

/// Content planning, drafting and revision.
#[async_trait]
pub trait ContentEngine: Send + Sync {
    async fn generate_content_brief(&self, topic: &str, keyword: &str) -> ServiceResult<ContentBrief>;

    async fn create_outline(&self, topic: &str, keyword: &str) -> ServiceResult<ContentOutline>;

    async fn generate_titles(&self, keyword: &str, count: usize) -> ServiceResult<Vec<TitleCandidate>>;

    async fn create_content(
        &self,
        topic: &str,
        keyword: &str,
        word_count: u32,
    ) -> ServiceResult<DraftContent>;

    /// Rewrite `text` in `style`. `guidance` carries reviewer feedback the
    /// rewrite must address.
    async fn rewrite_content(
        &self,
        text: &str,
        style: RewriteStyle,
        guidance: Option<&str>,
    ) -> ServiceResult<String>;

    async fn generate_schema(&self, schema_type: &str, data: JsonMap) -> ServiceResult<SchemaMarkup>;
}

/// Keyword discovery and SERP insight.
#[async_trait]
pub trait KeywordEngine: Send + Sync {
    async fn discover_keywords(&self, seed: &str, limit: usize) -> ServiceResult<KeywordDiscovery>;

    async fn find_long_tail(&self, seed: &str, count: usize) -> ServiceResult<LongTailSet>;

    async fn find_questions(&self, seed: &str, count: usize) -> ServiceResult<QuestionSet>;

    async fn analyze_serp(&self, keyword: &str) -> ServiceResult<SerpAnalysis>;

    async fn cluster_keywords(&self, keywords: &[String]) -> ServiceResult<KeywordClusters>;
}

/// Competitor profiling and comparison.
#[async_trait]
pub trait CompetitiveIntel: Send + Sync {
    async fn analyze_competitor(&self, domain: &str) -> ServiceResult<CompetitorProfile>;

    async fn compare_domains(
        &self,
        your_domain: &str,
        competitors: &[String],
    ) -> ServiceResult<DomainComparison>;

    async fn find_content_gaps(
        &self,
        your_domain: &str,
        competitors: &[String],
    ) -> ServiceResult<ContentGapReport>;

    async fn estimate_traffic(&self, domain: &str) -> ServiceResult<TrafficEstimate>;
}

/// Answer-engine citability analysis.
#[async_trait]
pub trait AeoAnalyzer: Send + Sync {
    async fn analyze_winning_pattern(&self, keyword: &str) -> ServiceResult<CitabilityPattern>;
}

/// The full set of collaborators an agent run may use.
#[derive(Clone)]
pub struct Services {
    pub auditor: Arc<dyn SeoAuditor>,
    pub content: Arc<dyn ContentEngine>,
    pub keywords: Arc<dyn KeywordEngine>,
    pub competitive: Arc<dyn CompetitiveIntel>,
    pub aeo: Arc<dyn AeoAnalyzer>,
}

impl Services {
    /// Production collaborators sharing one LLM client.
    pub fn from_config(config: &Config, llm: Arc<dyn LlmClient>) -> ServiceResult<Self> {
        let model = PromptRunner::new(llm, config.default_model.clone());
        Ok(Self {
            auditor: Arc::new(HttpSeoAuditor::new(config.audit_timeout)?),
            content: Arc::new(LlmContentEngine::new(model.clone())),
            keywords: Arc::new(LlmKeywordEngine::new(model.clone())),
            competitive: Arc::new(LlmCompetitiveIntel::new(model.clone())),
            aeo: Arc::new(LlmAeoAnalyzer::new(model)),
        })
    }
}

/// An LLM client bound to a model, issuing single-prompt calls.
#[derive(Clone)]
pub struct PromptRunner {
    llm: Arc<dyn LlmClient>,
    model: String,
}

impl PromptRunner {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// Ask for JSON and deserialize it.
    pub async fn json<T: DeserializeOwned>(&self, prompt: &str, max_tokens: u64) -> Result<T, LlmError> {
        complete_json(
            self.llm.as_ref(),
            &self.model,
            &[ChatMessage::user(prompt)],
            ChatOptions::max_tokens(max_tokens),
        )
        .await
    }

    /// Ask for free text.
    pub async fn text(&self, prompt: &str, max_tokens: u64) -> Result<String, LlmError> {
        complete_text(
            self.llm.as_ref(),
            &self.model,
            &[ChatMessage::user(prompt)],
            ChatOptions::max_tokens(max_tokens),
        )
        .await
    }
}
