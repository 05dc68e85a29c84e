//! Citability ("AEO DNA") analysis: what makes a source quotable by answer
//! engines for a given query.

use async_trait::async_trait;
use serde_json::json;

use super::{AeoAnalyzer, CitabilityPattern, JsonMap, PromptRunner, ServiceResult};
use crate::llm::structured::or_fallback;

pub struct LlmAeoAnalyzer {
    model: PromptRunner,
}

impl LlmAeoAnalyzer {
    pub fn new(model: PromptRunner) -> Self {
        Self { model }
    }
}

#[async_trait]
impl AeoAnalyzer for LlmAeoAnalyzer {
    async fn analyze_winning_pattern(&self, keyword: &str) -> ServiceResult<CitabilityPattern> {
        tracing::info!(keyword, "Analyzing citability pattern");

        let prompt = format!(
            r#"Analyze the "Winning Pattern" for the keyword: "{keyword}"

Imagine you are an AI answer engine. What characteristics make a source "citable" for this query?
Reverse engineer the perfect response structure.

Return JSON:
{{
    "niche": "<category>",
    "query_intent": "<informational/commercial>",
    "structural_dna": {{
        "avg_paragraph_length_words": <int>,
        "preferred_schema": ["<schema1>", "<schema2>"],
        "entity_density_score": <0-10>,
        "requires_table": <bool>,
        "requires_code_block": <bool>
    }},
    "content_template": [
        {{"section": "Introduction", "must_include": ["<definition>", "<stat>"]}},
        {{"section": "Main Body", "structure": "<list/comparison>"}}
    ]
}}"#
        );
        let result = self.model.json(&prompt, 1500).await;
        Ok(or_fallback(result, "analyze_winning_pattern", fallback_pattern))
    }
}

fn fallback_pattern() -> CitabilityPattern {
    let mut structural_dna = JsonMap::new();
    structural_dna.insert("preferred_schema".to_string(), json!(["FAQPage"]));
    structural_dna.insert("entity_density_score".to_string(), json!(8.5));
    CitabilityPattern {
        niche: Some("Tech".to_string()),
        structural_dna,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::DisabledClient;
    use crate::services::testing::ScriptedLlm;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_parses_pattern() {
        let llm = Arc::new(ScriptedLlm::always(
            "```json\n{\"niche\": \"Finance\", \"structural_dna\": {\"requires_table\": true}}\n```",
        ));
        let analyzer = LlmAeoAnalyzer::new(PromptRunner::new(llm, "test"));

        let pattern = analyzer.analyze_winning_pattern("index funds").await.unwrap();
        assert_eq!(pattern.niche.as_deref(), Some("Finance"));
        assert_eq!(pattern.structural_dna["requires_table"], true);
    }

    #[tokio::test]
    async fn test_fallback_pattern() {
        let analyzer = LlmAeoAnalyzer::new(PromptRunner::new(Arc::new(DisabledClient), "test"));
        let pattern = analyzer.analyze_winning_pattern("anything").await.unwrap();
        assert_eq!(pattern.niche.as_deref(), Some("Tech"));
        assert_eq!(pattern.structural_dna["preferred_schema"], json!(["FAQPage"]));
    }
}
