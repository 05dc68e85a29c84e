//! Competitive analysis agent.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

use super::types::{AgentError, CompetitiveParams};
use super::{Agent, AgentContext};
use crate::services::{ContentGapReport, CompetitorProfile, DomainComparison, TrafficEstimate};

/// Competitors beyond this many are ignored.
pub const MAX_COMPETITORS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct CompetitiveReport {
    pub your_domain: String,
    pub your_analysis: CompetitorProfile,
    pub competitor_analyses: BTreeMap<String, CompetitorProfile>,
    pub comparison: DomainComparison,
    pub content_gaps: ContentGapReport,
    pub traffic_estimate: TrafficEstimate,
    pub strategic_recommendations: Vec<String>,
}

pub struct CompetitiveAnalysisAgent;

#[async_trait]
impl Agent for CompetitiveAnalysisAgent {
    type Params = CompetitiveParams;
    type Output = CompetitiveReport;

    async fn run(
        &self,
        params: CompetitiveParams,
        ctx: &AgentContext,
    ) -> Result<CompetitiveReport, AgentError> {
        let intel = &ctx.services.competitive;
        let domain = params.your_domain.as_str();

        if params.competitors.len() > MAX_COMPETITORS {
            tracing::debug!(
                supplied = params.competitors.len(),
                "Ignoring competitors beyond the first {}",
                MAX_COMPETITORS
            );
        }
        let competitors: Vec<String> = params
            .competitors
            .iter()
            .take(MAX_COMPETITORS)
            .cloned()
            .collect();

        ctx.progress
            .log(format!("Analyzing {} against {} competitors", domain, competitors.len()))
            .await;
        let your_analysis = intel.analyze_competitor(domain).await?;

        let mut competitor_analyses = BTreeMap::new();
        for competitor in &competitors {
            let profile = intel.analyze_competitor(competitor).await?;
            competitor_analyses.insert(competitor.clone(), profile);
        }

        let comparison = intel.compare_domains(domain, &competitors).await?;
        let content_gaps = intel.find_content_gaps(domain, &competitors).await?;
        let traffic_estimate = intel.estimate_traffic(domain).await?;

        Ok(CompetitiveReport {
            your_domain: params.your_domain.clone(),
            your_analysis,
            competitor_analyses,
            strategic_recommendations: comparison.action_items.clone(),
            comparison,
            content_gaps,
            traffic_estimate,
        })
    }
}
