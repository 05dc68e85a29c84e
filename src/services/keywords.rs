//! LLM-backed keyword engine.

use async_trait::async_trait;
use serde_json::json;

use super::{
    JsonMap, KeywordCluster, KeywordClusters, KeywordDiscovery, KeywordEngine, LongTailSet,
    PromptRunner, QuestionSet, SerpAnalysis, ServiceResult,
};
use crate::llm::structured::or_fallback;

pub struct LlmKeywordEngine {
    model: PromptRunner,
}

impl LlmKeywordEngine {
    pub fn new(model: PromptRunner) -> Self {
        Self { model }
    }
}

#[async_trait]
impl KeywordEngine for LlmKeywordEngine {
    async fn discover_keywords(&self, seed: &str, limit: usize) -> ServiceResult<KeywordDiscovery> {
        let prompt = format!(
            r#"Generate {limit} keyword variations for: "{seed}"

Include:
- Long-tail variations
- Question-based keywords
- Commercial intent keywords
- Informational keywords

Return JSON: {{"keywords": [{{"keyword": "<text>", "search_volume_estimate": "<high/medium/low>",
"intent": "<informational/commercial/transactional/navigational>", "difficulty": "<easy/medium/hard>",
"strategy": "<one sentence on how to rank for this>"}}]}}"#
        );
        let result = self.model.json::<KeywordDiscovery>(&prompt, 3000).await;
        let mut discovery = or_fallback(result, "discover_keywords", || {
            let mut extra = JsonMap::new();
            extra.insert("data_source".to_string(), json!("fallback"));
            KeywordDiscovery {
                extra,
                ..Default::default()
            }
        });
        discovery.seed_keyword = seed.to_string();
        discovery.total_found = discovery.keywords.len();
        Ok(discovery)
    }

    async fn find_long_tail(&self, seed: &str, count: usize) -> ServiceResult<LongTailSet> {
        let prompt = format!(
            r#"Generate {count} long-tail keyword variations for: "{seed}"
Focus on:
- Specific use cases
- Location-based variations
- Comparison keywords
- "How to" variations
- "Best" variations

Return JSON: {{"keyword": "{seed}", "long_tail": [{{"phrase": "<text>", "intent": "<type>", "difficulty": "<level>"}}]}}"#
        );
        let result = self.model.json(&prompt, 1500).await;
        Ok(or_fallback(result, "find_long_tail", || LongTailSet {
            keyword: seed.to_string(),
            ..Default::default()
        }))
    }

    async fn find_questions(&self, seed: &str, count: usize) -> ServiceResult<QuestionSet> {
        let prompt = format!(
            r#"Generate {count} question-based search queries for: "{seed}"
Include: What, How, Why, When, Where, Which, Can, Does, Is, Are questions

Return JSON: {{"keyword": "{seed}", "questions": [{{"question": "<text>", "intent": "<type>", "featured_snippet_potential": <true/false>}}]}}"#
        );
        let result = self.model.json(&prompt, 1200).await;
        Ok(or_fallback(result, "find_questions", || QuestionSet {
            keyword: seed.to_string(),
            ..Default::default()
        }))
    }

    async fn analyze_serp(&self, keyword: &str) -> ServiceResult<SerpAnalysis> {
        let prompt = format!(
            r#"Analyze what the Google SERP would look like for: "{keyword}"

Return JSON:
{{"keyword": "{keyword}",
"serp_features": [<"featured_snippet", "people_also_ask", "local_pack", "images", "videos", "shopping", "news">],
"organic_difficulty": <0-100>,
"top_ranking_content_types": [<"blog", "product", "video", "tool">],
"average_content_length": <words>,
"ranking_factors": [<important factors>],
"opportunity_score": <0-100>,
"recommendations": [<list>]}}"#
        );
        let result = self.model.json(&prompt, 1000).await;
        Ok(or_fallback(result, "analyze_serp", || {
            let mut extra = JsonMap::new();
            extra.insert("organic_difficulty".to_string(), json!(0));
            extra.insert("data_source".to_string(), json!("fallback"));
            SerpAnalysis {
                keyword: keyword.to_string(),
                serp_features: Vec::new(),
                extra,
            }
        }))
    }

    async fn cluster_keywords(&self, keywords: &[String]) -> ServiceResult<KeywordClusters> {
        let prompt = format!(
            r#"Cluster these keywords by topic and intent: {}

Return JSON: {{"clusters": [{{"name": "<cluster name>", "intent": "<type>", "keywords": [<list>], "recommended_page_type": "<type>"}}]}}"#,
            json!(keywords)
        );
        let result = self.model.json(&prompt, 1500).await;
        Ok(or_fallback(result, "cluster_keywords", || KeywordClusters {
            clusters: vec![KeywordCluster {
                name: "Uncategorized".to_string(),
                keywords: keywords.to_vec(),
                extra: JsonMap::new(),
            }],
            extra: JsonMap::new(),
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
    async fn test_discovery_counts_parsed_keywords() {
        let llm = Arc::new(ScriptedLlm::always(
            r#"{"keywords": [{"keyword": "a", "intent": "commercial"}, {"keyword": "b"}]}"#,
        ));
        let engine = LlmKeywordEngine::new(PromptRunner::new(llm, "test"));

        let discovery = engine.discover_keywords("seed", 50).await.unwrap();
        assert_eq!(discovery.seed_keyword, "seed");
        assert_eq!(discovery.total_found, 2);
        assert_eq!(discovery.keywords[0].extra["intent"], "commercial");
    }

    #[tokio::test]
    async fn test_offline_fallbacks_are_empty() {
        let engine = LlmKeywordEngine::new(PromptRunner::new(Arc::new(DisabledClient), "test"));

        let discovery = engine.discover_keywords("seed", 50).await.unwrap();
        assert_eq!(discovery.total_found, 0);
        assert_eq!(discovery.extra["data_source"], "fallback");

        let long_tail = engine.find_long_tail("seed", 20).await.unwrap();
        assert!(long_tail.long_tail.is_empty());

        let clusters = engine
            .cluster_keywords(&["x".to_string(), "y".to_string()])
            .await
            .unwrap();
        assert_eq!(clusters.clusters[0].name, "Uncategorized");
        assert_eq!(clusters.clusters[0].keywords.len(), 2);
    }
}
