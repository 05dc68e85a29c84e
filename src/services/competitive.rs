//! LLM-backed competitive intelligence.
//!
//! Third-party authority and performance data sources are not wired in; the
//! profile is the model's estimate and is labelled as such.

use async_trait::async_trait;
use serde_json::json;

use super::{
    CompetitiveIntel, CompetitorProfile, ContentGapReport, DomainComparison, JsonMap,
    PromptRunner, ServiceResult, TrafficEstimate,
};
use crate::llm::structured::or_fallback;
use crate::util::extract_domain;

pub struct LlmCompetitiveIntel {
    model: PromptRunner,
}

impl LlmCompetitiveIntel {
    pub fn new(model: PromptRunner) -> Self {
        Self { model }
    }
}

#[async_trait]
impl CompetitiveIntel for LlmCompetitiveIntel {
    async fn analyze_competitor(&self, domain: &str) -> ServiceResult<CompetitorProfile> {
        let domain = extract_domain(domain);
        let prompt = format!(
            r#"Profile the website "{domain}" as an SEO competitor.

Return JSON:
{{"domain": "{domain}",
"estimated_authority": <0-100>,
"estimated_traffic": "<high/medium/low>",
"strengths": [<list>],
"weaknesses": [<list>],
"opportunities_against": [<3-4 specific actions>]}}"#
        );
        let result = self
            .model
            .json::<CompetitorProfile>(&prompt, 1000)
            .await
            .map(|mut profile| {
                profile
                    .extra
                    .insert("data_source".to_string(), json!("llm_estimate"));
                profile
            });
        let mut profile = or_fallback(result, "analyze_competitor", || {
            let mut extra = JsonMap::new();
            extra.insert("data_source".to_string(), json!("fallback"));
            extra.insert("confidence".to_string(), json!("low"));
            CompetitorProfile {
                extra,
                ..Default::default()
            }
        });
        profile.domain = domain;
        Ok(profile)
    }

    async fn compare_domains(
        &self,
        your_domain: &str,
        competitors: &[String],
    ) -> ServiceResult<DomainComparison> {
        let prompt = format!(
            r#"Compare these domains: Your site: {your_domain}, Competitors: {}

Return JSON:
{{"your_domain": "{your_domain}",
"comparison": [
    {{"domain": "<domain>", "authority_estimate": <0-100>, "traffic_estimate": "<level>",
    "content_quality": <0-100>, "seo_strength": <0-100>}}
],
"your_position": <rank number>,
"key_differentiators": [<list>],
"gaps_to_close": [<list>],
"action_items": [<prioritized list>]}}"#,
            json!(competitors)
        );
        let result = self.model.json(&prompt, 2000).await;
        Ok(or_fallback(result, "compare_domains", || DomainComparison {
            your_domain: your_domain.to_string(),
            ..Default::default()
        }))
    }

    async fn find_content_gaps(
        &self,
        your_domain: &str,
        competitors: &[String],
    ) -> ServiceResult<ContentGapReport> {
        let prompt = format!(
            r#"Identify content gaps between {your_domain} and competitors: {}

Return JSON:
{{"your_domain": "{your_domain}",
"content_gaps": [
    {{"topic": "<topic>", "opportunity_score": <0-100>, "competitors_covering": [<domains>],
    "recommended_content_type": "<type>", "priority": "<high/medium/low>"}}
],
"quick_wins": [<easy topics to cover>],
"strategic_opportunities": [<long-term topics>]}}"#,
            json!(competitors)
        );
        let result = self.model.json(&prompt, 2000).await;
        Ok(or_fallback(result, "find_content_gaps", || ContentGapReport {
            your_domain: your_domain.to_string(),
            ..Default::default()
        }))
    }

    async fn estimate_traffic(&self, domain: &str) -> ServiceResult<TrafficEstimate> {
        let prompt = format!(
            r#"Estimate traffic metrics for: {domain}

Return JSON:
{{"domain": "{domain}",
"monthly_visits_estimate": <number>,
"traffic_trend": "<growing/stable/declining>",
"top_traffic_sources": [<"organic", "direct", "referral", "social">],
"geographic_distribution": [<top countries>],
"mobile_vs_desktop": {{"mobile": <percent>, "desktop": <percent>}}}}"#
        );
        let result = self.model.json(&prompt, 800).await;
        Ok(or_fallback(result, "estimate_traffic", || {
            let mut extra = JsonMap::new();
            extra.insert("monthly_visits_estimate".to_string(), json!(50000));
            extra.insert("traffic_trend".to_string(), json!("stable"));
            TrafficEstimate {
                domain: domain.to_string(),
                extra,
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::DisabledClient;
    use crate::services::testing::ScriptedLlm;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_profile_normalizes_domain() {
        let llm = Arc::new(ScriptedLlm::always(
            r#"{"domain": "whatever", "estimated_authority": 140, "strengths": ["docs"]}"#,
        ));
        let intel = LlmCompetitiveIntel::new(PromptRunner::new(llm, "test"));

        let profile = intel
            .analyze_competitor("https://www.rival.io/blog")
            .await
            .unwrap();
        assert_eq!(profile.domain, "rival.io");
        assert_eq!(profile.estimated_authority, 100);
        assert_eq!(profile.extra["data_source"], "llm_estimate");
    }

    #[tokio::test]
    async fn test_loose_numbers_and_object_actions_are_kept() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            r#"{"domain": "rival.io", "estimated_authority": 67.5}"#.to_string(),
            r#"{"your_domain": "mine.com", "comparison": [],
                "action_items": [{"action": "Publish comparison pages", "priority": "high"}, "Fix titles"]}"#
                .to_string(),
        ]));
        let intel = LlmCompetitiveIntel::new(PromptRunner::new(llm, "test"));

        let profile = intel.analyze_competitor("rival.io").await.unwrap();
        assert_eq!(profile.estimated_authority, 68);
        assert_eq!(profile.extra["data_source"], "llm_estimate");

        let comparison = intel
            .compare_domains("mine.com", &["rival.io".to_string()])
            .await
            .unwrap();
        assert_eq!(
            comparison.action_items,
            vec!["Publish comparison pages", "Fix titles"]
        );
    }

    #[tokio::test]
    async fn test_offline_fallbacks() {
        let intel = LlmCompetitiveIntel::new(PromptRunner::new(Arc::new(DisabledClient), "test"));
        let competitors = vec!["a.com".to_string()];

        let profile = intel.analyze_competitor("mine.com").await.unwrap();
        assert_eq!(profile.estimated_authority, 0);
        assert_eq!(profile.extra["confidence"], "low");

        let comparison = intel.compare_domains("mine.com", &competitors).await.unwrap();
        assert!(comparison.action_items.is_empty());

        let gaps = intel.find_content_gaps("mine.com", &competitors).await.unwrap();
        assert!(gaps.content_gaps.is_empty());

        let traffic = intel.estimate_traffic("mine.com").await.unwrap();
        assert_eq!(traffic.extra["monthly_visits_estimate"], 50000);
    }
}
