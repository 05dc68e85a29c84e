//! Full SEO strategy: a composite of the other agents.
//!
//! Audit, keyword research and (when competitors are given) competitive
//! analysis run concurrently inside the calling task. Each sub-run is
//! isolated: an error or a panic becomes an error marker in its slot and the
//! siblings are unaffected. A content plan for the first target keyword
//! follows, isolated the same way.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use chrono::Utc;
use futures::FutureExt;
use serde::Serialize;

use super::audit::{AuditReport, SeoAuditAgent};
use super::competitive::{CompetitiveAnalysisAgent, CompetitiveReport};
use super::content::{ContentCreationAgent, ContentReport};
use super::keywords::{KeywordReport, KeywordResearchAgent};
use super::types::{
    AgentError, AgentKind, AuditParams, CompetitiveParams, ContentOptions, ContentParams,
    KeywordOptions, KeywordParams, StrategyParams, SubResult,
};
use super::{Agent, AgentContext};
use crate::task::timestamp;
use crate::util::panic_message;

const OPPORTUNITY_THRESHOLD: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct StrategyReport {
    pub domain: String,
    pub started_at: String,
    pub seo_audit: SubResult<AuditReport>,
    pub keyword_research: SubResult<KeywordReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitive_analysis: Option<SubResult<CompetitiveReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_strategy: Option<SubResult<ContentReport>>,
    pub completed_at: String,
    pub recommendations: Vec<String>,
}

/// Await a sub-agent run, turning its error or panic into an error marker.
async fn isolated<T, F>(kind: AgentKind, run: F) -> SubResult<T>
where
    F: Future<Output = Result<T, AgentError>>,
{
    match AssertUnwindSafe(run).catch_unwind().await {
        Ok(Ok(output)) => SubResult::Ok(output),
        Ok(Err(e)) => {
            tracing::warn!(agent = %kind, error = %e, "Sub-agent failed");
            SubResult::error(e.to_string())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(agent = %kind, panic = %message, "Sub-agent panicked");
            SubResult::error(format!("{} panicked: {}", kind, message))
        }
    }
}

/// Prioritized actions from simple thresholds over the sub-results.
pub fn priority_actions(
    audit: &SubResult<AuditReport>,
    keywords: &SubResult<KeywordReport>,
    competitive: Option<&SubResult<CompetitiveReport>>,
) -> Vec<String> {
    let mut actions = Vec::new();

    if audit.ok().is_some_and(|a| a.summary.critical_issues > 0) {
        actions.push("URGENT: Fix critical SEO issues found in audit".to_string());
    }
    if keywords
        .ok()
        .is_some_and(|k| k.total_opportunities > OPPORTUNITY_THRESHOLD)
    {
        actions.push("HIGH: You have 20+ keyword opportunities to target".to_string());
    }
    if competitive
        .and_then(SubResult::ok)
        .is_some_and(|c| !c.content_gaps.content_gaps.is_empty())
    {
        actions.push("MEDIUM: Address content gaps vs competitors".to_string());
    }

    if actions.is_empty() {
        actions.push("Continue monitoring and creating quality content".to_string());
    }
    actions
}

pub struct FullStrategyAgent;

#[async_trait]
impl Agent for FullStrategyAgent {
    type Params = StrategyParams;
    type Output = StrategyReport;

    async fn run(&self, params: StrategyParams, ctx: &AgentContext) -> Result<StrategyReport, AgentError> {
        let started_at = timestamp(Utc::now());
        let seed = params
            .target_keywords
            .first()
            .cloned()
            .unwrap_or_else(|| params.domain.clone());

        ctx.progress
            .log(format!("Running strategy sub-agents for {}", params.domain))
            .await;

        let audit = isolated(
            AgentKind::SeoAudit,
            SeoAuditAgent.run(
                AuditParams {
                    url: params.domain.clone(),
                    options: None,
                },
                ctx,
            ),
        );
        let keywords = isolated(
            AgentKind::KeywordResearch,
            KeywordResearchAgent.run(
                KeywordParams {
                    seed_keyword: seed,
                    options: KeywordOptions::default(),
                },
                ctx,
            ),
        );
        let competitive = async {
            if params.competitors.is_empty() {
                return None;
            }
            let run = CompetitiveAnalysisAgent.run(
                CompetitiveParams {
                    your_domain: params.domain.clone(),
                    competitors: params.competitors.clone(),
                    options: None,
                },
                ctx,
            );
            Some(isolated(AgentKind::CompetitiveAnalysis, run).await)
        };

        let (seo_audit, keyword_research, competitive_analysis) =
            tokio::join!(audit, keywords, competitive);

        let content_strategy = match params.target_keywords.first() {
            Some(keyword) => {
                let run = ContentCreationAgent.run(
                    ContentParams {
                        topic: format!("Guide to {}", keyword),
                        keyword: keyword.clone(),
                        options: ContentOptions {
                            generate_content: false,
                            ..ContentOptions::default()
                        },
                    },
                    ctx,
                );
                Some(isolated(AgentKind::ContentCreation, run).await)
            }
            None => None,
        };

        let recommendations =
            priority_actions(&seo_audit, &keyword_research, competitive_analysis.as_ref());

        Ok(StrategyReport {
            domain: params.domain,
            started_at,
            seo_audit,
            keyword_research,
            competitive_analysis,
            content_strategy,
            completed_at: timestamp(Utc::now()),
            recommendations,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::agents::testing::{context, context_with};
    use crate::services::testing::{stub_services, FailingCompetitive, StubAuditor, StubKeywords};

    fn params(keywords: &[&str], competitors: &[&str]) -> StrategyParams {
        StrategyParams {
            domain: "example.com".to_string(),
            target_keywords: keywords.iter().map(|s| s.to_string()).collect(),
            competitors: competitors.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_all_rules_fire() {
        let report = FullStrategyAgent
            .run(params(&["espresso"], &["rival.com"]), &context())
            .await
            .unwrap();

        assert_eq!(
            report.recommendations,
            vec![
                "URGENT: Fix critical SEO issues found in audit",
                "HIGH: You have 20+ keyword opportunities to target",
                "MEDIUM: Address content gaps vs competitors",
            ]
        );
        assert_eq!(report.keyword_research.ok().unwrap().seed_keyword, "espresso");
        let plan = report.content_strategy.as_ref().and_then(SubResult::ok).unwrap();
        assert!(plan.content.is_none());
        assert_eq!(plan.outline.topic, "Guide to espresso");
        assert!(report.started_at <= report.completed_at);
    }

    #[tokio::test]
    async fn test_competitive_failure_is_isolated() {
        let mut services = stub_services();
        services.competitive = Arc::new(FailingCompetitive);

        let report = FullStrategyAgent
            .run(params(&["espresso"], &["rival.com"]), &context_with(services))
            .await
            .unwrap();

        let competitive = report.competitive_analysis.as_ref().unwrap();
        assert!(competitive.is_error());
        assert!(report.seo_audit.ok().is_some());
        assert!(report.keyword_research.ok().is_some());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["competitive_analysis"]["error"]
            .as_str()
            .unwrap()
            .contains("stub outage"));
        assert!(json["seo_audit"]["summary"].is_object());
    }

    #[tokio::test]
    async fn test_no_keywords_or_competitors() {
        let mut services = stub_services();
        services.auditor = Arc::new(StubAuditor { critical: 0 });
        services.keywords = Arc::new(StubKeywords {
            keywords: 5,
            long_tail: 5,
        });

        let report = FullStrategyAgent
            .run(params(&[], &[]), &context_with(services))
            .await
            .unwrap();

        assert!(report.competitive_analysis.is_none());
        assert!(report.content_strategy.is_none());
        assert_eq!(report.keyword_research.ok().unwrap().seed_keyword, "example.com");
        assert_eq!(
            report.recommendations,
            vec!["Continue monitoring and creating quality content"]
        );

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("competitive_analysis").is_none());
    }

    #[tokio::test]
    async fn test_panicking_sub_agent_becomes_marker() {
        let exploding = async {
            if true {
                panic!("collaborator exploded");
            }
            Ok::<u8, AgentError>(1)
        };
        let marker = isolated(AgentKind::SeoAudit, exploding).await;
        match marker {
            SubResult::Error { error } => assert!(error.contains("collaborator exploded")),
            SubResult::Ok(_) => panic!("expected error marker"),
        }
    }

    #[test]
    fn test_failed_slots_trigger_no_rules() {
        let audit: SubResult<AuditReport> = SubResult::error("down");
        let keywords: SubResult<KeywordReport> = SubResult::error("down");
        assert_eq!(
            priority_actions(&audit, &keywords, None),
            vec!["Continue monitoring and creating quality content"]
        );
    }
}
