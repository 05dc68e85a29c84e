//! LLM-backed content engine.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{
    ContentBrief, ContentEngine, ContentOutline, DraftContent, JsonMap, OutlineSection,
    PromptRunner, RewriteStyle, SchemaMarkup, ServiceResult, TitleCandidate,
};
use crate::llm::structured::or_fallback;

pub struct LlmContentEngine {
    model: PromptRunner,
}

impl LlmContentEngine {
    pub fn new(model: PromptRunner) -> Self {
        Self { model }
    }
}

#[async_trait]
impl ContentEngine for LlmContentEngine {
    async fn generate_content_brief(&self, topic: &str, keyword: &str) -> ServiceResult<ContentBrief> {
        let prompt = format!(
            r#"Create a comprehensive content brief for: "{topic}"
Target keyword: {keyword}
Content type: blog_post

Return JSON with:
{{"title": "<compelling title>", "meta_description": "<160 chars>",
"outline": [{{"section": "<name>", "points": [<list>]}}],
"semantic_keywords": [<10-15 related keywords>],
"questions_to_answer": [<5-7 questions>],
"target_word_count": <number>,
"tone": "<recommended tone>"}}"#
        );
        let result = self.model.json(&prompt, 2000).await;
        Ok(or_fallback(result, "generate_content_brief", || {
            fallback_brief(topic, keyword)
        }))
    }

    async fn create_outline(&self, topic: &str, keyword: &str) -> ServiceResult<ContentOutline> {
        let prompt = format!(
            r#"Create a detailed content outline for: "{topic}"
Target keyword: {keyword}

Return JSON: {{"topic": "<topic>", "sections": [{{"heading": "<H2>", "subheadings": [<H3 list>], "key_points": [<list>]}}]}}"#
        );
        let result = self.model.json(&prompt, 1500).await;
        Ok(or_fallback(result, "create_outline", || ContentOutline {
            topic: topic.to_string(),
            sections: Vec::<OutlineSection>::new(),
            extra: JsonMap::new(),
        }))
    }

    async fn generate_titles(&self, keyword: &str, count: usize) -> ServiceResult<Vec<TitleCandidate>> {
        let prompt = format!(
            r#"Generate {count} SEO-optimized title tags for keyword: "{keyword}"
Each title should be:
- Under 60 characters
- Include the keyword naturally
- Use power words for CTR

Return JSON array: [{{"title": "<title>", "length": <chars>, "power_words": [<list>]}}]"#
        );
        let result = self.model.json::<Vec<TitleCandidate>>(&prompt, 800).await;
        let titles = or_fallback(result, "generate_titles", Vec::new);
        if titles.is_empty() {
            return Ok(vec![TitleCandidate::new(format!("{} - Complete Guide", keyword))]);
        }
        Ok(titles)
    }

    async fn create_content(
        &self,
        topic: &str,
        keyword: &str,
        word_count: u32,
    ) -> ServiceResult<DraftContent> {
        let prompt = format!(
            r#"Write a comprehensive, SEO-optimized article about: "{topic}"
Primary keyword: {keyword}
Target length: {word_count} words

Include:
- Engaging introduction
- Clear section headings (H2, H3)
- Naturally integrated keywords
- Practical examples
- Strong conclusion with CTA

Write in a professional, engaging tone. Output the full article."#
        );
        match self.model.text(&prompt, 4000).await {
            Ok(text) => Ok(DraftContent::from_text(text, keyword)),
            Err(e) => {
                tracing::warn!(call = "create_content", error = %e, "LLM call failed, using fallback");
                let mut draft = DraftContent::from_text(
                    format!("# {}\n\nThis is placeholder content...", topic),
                    keyword,
                );
                draft.extra.insert("note".to_string(), json!("fallback"));
                Ok(draft)
            }
        }
    }

    async fn rewrite_content(
        &self,
        text: &str,
        style: RewriteStyle,
        guidance: Option<&str>,
    ) -> ServiceResult<String> {
        let mut prompt = format!("{}:\n\n", style.instruction());
        if let Some(guidance) = guidance.filter(|g| !g.trim().is_empty()) {
            prompt.push_str("Address ALL of this reviewer feedback:\n");
            prompt.push_str(guidance);
            prompt.push_str("\n\nText:\n");
        }
        prompt.push_str(text);
        prompt.push_str("\n\nReturn only the rewritten text.");

        let result = self.model.text(&prompt, 2000).await;
        Ok(or_fallback(result, "rewrite_content", || text.to_string()))
    }

    async fn generate_schema(&self, schema_type: &str, data: JsonMap) -> ServiceResult<SchemaMarkup> {
        let prompt = format!(
            "Generate valid JSON-LD schema markup for type: {}\nData provided: {}\n\n\
             Return the complete, valid JSON-LD schema object.",
            schema_type,
            Value::Object(data.clone())
        );
        let result = self.model.json::<Value>(&prompt, 1000).await;
        let schema = or_fallback(result, "generate_schema", || fallback_schema(schema_type, data));
        Ok(SchemaMarkup::new(schema))
    }
}

fn fallback_brief(topic: &str, keyword: &str) -> ContentBrief {
    let mut extra = JsonMap::new();
    extra.insert(
        "semantic_keywords".to_string(),
        json!([keyword, format!("{} tips", keyword), format!("best {}", keyword)]),
    );
    extra.insert(
        "questions_to_answer".to_string(),
        json!([format!("What is {}?", keyword), format!("How to use {}?", keyword)]),
    );
    extra.insert("target_word_count".to_string(), json!(1500));
    ContentBrief {
        title: Some(format!("Complete Guide to {}", topic)),
        meta_description: Some(format!(
            "Discover everything about {}. Expert tips and strategies.",
            keyword
        )),
        extra,
        ..Default::default()
    }
}

fn fallback_schema(schema_type: &str, data: JsonMap) -> Value {
    let mut schema = JsonMap::new();
    schema.insert("@context".to_string(), json!("https://schema.org"));
    schema.insert("@type".to_string(), json!(schema_type));
    schema.extend(data);
    Value::Object(schema)
}
