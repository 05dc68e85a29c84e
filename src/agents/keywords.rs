//! Keyword research agent.

use async_trait::async_trait;
use serde::Serialize;

use super::types::{AgentError, KeywordParams};
use super::{Agent, AgentContext};
use crate::services::{KeywordClusters, KeywordDiscovery, LongTailSet, QuestionSet, SerpAnalysis};

const LONG_TAIL_COUNT: usize = 20;
const QUESTION_COUNT: usize = 15;
/// Only the leading discovered keywords are clustered.
const CLUSTER_INPUT: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct KeywordReport {
    pub seed_keyword: String,
    pub discovered_keywords: KeywordDiscovery,
    pub long_tail: LongTailSet,
    pub questions: QuestionSet,
    pub serp_analysis: SerpAnalysis,
    pub clusters: KeywordClusters,
    /// Discovered keywords plus long-tail phrases
    pub total_opportunities: usize,
}

pub struct KeywordResearchAgent;

#[async_trait]
impl Agent for KeywordResearchAgent {
    type Params = KeywordParams;
    type Output = KeywordReport;

    async fn run(&self, params: KeywordParams, ctx: &AgentContext) -> Result<KeywordReport, AgentError> {
        let engine = &ctx.services.keywords;
        let seed = params.seed_keyword.as_str();

        ctx.progress.log(format!("Researching keywords for '{}'", seed)).await;
        let discovered = engine.discover_keywords(seed, params.options.limit).await?;
        let long_tail = engine.find_long_tail(seed, LONG_TAIL_COUNT).await?;
        let questions = engine.find_questions(seed, QUESTION_COUNT).await?;
        let serp_analysis = engine.analyze_serp(seed).await?;

        let to_cluster: Vec<String> = discovered
            .keywords
            .iter()
            .take(CLUSTER_INPUT)
            .map(|k| k.keyword.clone())
            .collect();
        let clusters = engine.cluster_keywords(&to_cluster).await?;

        let total_opportunities = discovered.keywords.len() + long_tail.long_tail.len();
        tracing::info!(seed, total_opportunities, "Keyword research finished");

        Ok(KeywordReport {
            seed_keyword: params.seed_keyword,
            discovered_keywords: discovered,
            long_tail,
            questions,
            serp_analysis,
            clusters,
            total_opportunities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::{context, context_with};
    use crate::agents::types::KeywordOptions;
    use crate::services::testing::{stub_services, StubKeywords};
    use std::sync::Arc;

    fn params(limit: usize) -> KeywordParams {
        KeywordParams {
            seed_keyword: "coffee".to_string(),
            options: KeywordOptions { limit },
        }
    }

    #[tokio::test]
    async fn test_counts_opportunities() {
        let report = KeywordResearchAgent.run(params(50), &context()).await.unwrap();
        assert_eq!(report.discovered_keywords.keywords.len(), 15);
        assert_eq!(report.long_tail.long_tail.len(), 10);
        assert_eq!(report.total_opportunities, 25);
        assert_eq!(report.seed_keyword, "coffee");
    }

    #[tokio::test]
    async fn test_clusters_only_leading_keywords() {
        let mut services = stub_services();
        services.keywords = Arc::new(StubKeywords {
            keywords: 40,
            long_tail: 0,
        });
        let report = KeywordResearchAgent
            .run(params(50), &context_with(services))
            .await
            .unwrap();

        assert_eq!(report.total_opportunities, 40);
        assert_eq!(report.clusters.clusters[0].keywords.len(), 20);
        assert_eq!(report.clusters.clusters[0].keywords[0], "coffee 0");
    }

    #[tokio::test]
    async fn test_limit_is_passed_through() {
        let report = KeywordResearchAgent.run(params(5), &context()).await.unwrap();
        assert_eq!(report.discovered_keywords.total_found, 5);
    }
}
