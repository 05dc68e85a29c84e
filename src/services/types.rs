//! Result types returned by the analysis collaborators.
//!
//! Fields the agents read are typed. Everything else a collaborator returns
//! is kept verbatim in a flattened `extra` map so it still reaches the Task's
//! result payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::util::{score_0_100, text_items};

/// Untyped remainder of a collaborator response.
pub type JsonMap = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

/// Severity of an audit finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

/// One finding from an audit section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditIssue {
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

impl AuditIssue {
    pub fn new(
        severity: Severity,
        category: &str,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            title: title.into(),
            description: description.into(),
            category: category.to_string(),
            recommendation: None,
            fix: None,
        }
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }
}

/// A scored group of checks (technical, on-page, schema).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditSection {
    /// 0-100, starts at 100 and loses points per finding
    pub score: u8,
    pub issues: Vec<AuditIssue>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// Page facts surfaced alongside the audit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSummary {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub h1_count: usize,
    pub links: usize,
    pub images: usize,
    pub has_schema: bool,
    pub final_url: String,
}

/// Full audit of one URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    pub url: String,
    pub overall_score: f64,
    /// All section issues, in section order
    pub issues: Vec<AuditIssue>,
    pub technical_seo: AuditSection,
    pub on_page_seo: AuditSection,
    pub schema_markup: AuditSection,
    pub summary: PageSummary,
    pub pages_crawled: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_error: Option<String>,
}

impl AuditResult {
    /// Issues of the given severity, in report order.
    pub fn issues_with(&self, severity: Severity) -> impl Iterator<Item = &AuditIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Target parameters shared by the writer, the reviser and the critic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentBrief {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_keyword: Option<String>,
    /// Citability pattern injected before drafting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aeo_dna: Option<CitabilityPattern>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineSection {
    pub heading: String,
    pub subheadings: Vec<String>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentOutline {
    pub topic: String,
    pub sections: Vec<OutlineSection>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleCandidate {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

impl TitleCandidate {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            length: Some(title.chars().count()),
            title,
            extra: JsonMap::new(),
        }
    }
}

/// A generated article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftContent {
    pub content: String,
    pub word_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_density: Option<f64>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

impl DraftContent {
    /// Build a draft, deriving word count and keyword density from the text.
    pub fn from_text(content: String, keyword: &str) -> Self {
        let word_count = content.split_whitespace().count();
        let keyword_density = (word_count > 0 && !keyword.is_empty()).then(|| {
            let hits = content.to_lowercase().matches(&keyword.to_lowercase()).count();
            hits as f64 / word_count as f64 * 100.0
        });
        Self {
            content,
            word_count,
            keyword_density,
            extra: JsonMap::new(),
        }
    }
}

/// How the reviser should transform a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteStyle {
    /// Clarity and engagement pass, used between critic rounds
    Improve,
}

impl RewriteStyle {
    pub fn instruction(&self) -> &'static str {
        match self {
            RewriteStyle::Improve => "Improve clarity and engagement",
        }
    }
}

/// JSON-LD markup plus its embeddable `<script>` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaMarkup {
    pub schema: Value,
    pub html: String,
}

impl SchemaMarkup {
    pub fn new(schema: Value) -> Self {
        let html = format!(r#"<script type="application/ld+json">{}</script>"#, schema);
        Self { schema, html }
    }
}

/// "Citability DNA": the structure answer engines tend to cite for a query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CitabilityPattern {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub niche: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_intent: Option<String>,
    pub structural_dna: JsonMap,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub content_template: Vec<Value>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

// ---------------------------------------------------------------------------
// Keywords
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordIdea {
    pub keyword: String,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordDiscovery {
    pub seed_keyword: String,
    pub keywords: Vec<KeywordIdea>,
    pub total_found: usize,
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// Long-tail phrases. Entries are either plain strings or objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LongTailSet {
    pub keyword: String,
    pub long_tail: Vec<Value>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionSet {
    pub keyword: String,
    pub questions: Vec<Value>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SerpAnalysis {
    pub keyword: String,
    pub serp_features: Vec<String>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordCluster {
    pub name: String,
    pub keywords: Vec<String>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordClusters {
    pub clusters: Vec<KeywordCluster>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

// ---------------------------------------------------------------------------
// Competitive intelligence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompetitorProfile {
    pub domain: String,
    /// 0-100
    #[serde(deserialize_with = "score_0_100")]
    pub estimated_authority: u8,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainComparison {
    pub your_domain: String,
    pub comparison: Vec<Value>,
    /// Prioritized actions; surfaced as the agent's strategic recommendations
    #[serde(deserialize_with = "text_items")]
    pub action_items: Vec<String>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentGap {
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentGapReport {
    pub your_domain: String,
    pub content_gaps: Vec<ContentGap>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficEstimate {
    pub domain: String,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_brief_keeps_unknown_fields() {
        let brief: ContentBrief = serde_json::from_value(json!({
            "title": "Guide",
            "tone": "expert",
            "semantic_keywords": ["a", "b"]
        }))
        .unwrap();
        assert_eq!(brief.tone.as_deref(), Some("expert"));
        assert!(brief.extra.contains_key("semantic_keywords"));

        let back = serde_json::to_value(&brief).unwrap();
        assert_eq!(back["semantic_keywords"], json!(["a", "b"]));
    }

    #[test]
    fn test_draft_counts_words_and_density() {
        let draft = DraftContent::from_text("seo tips for seo teams".to_string(), "SEO");
        assert_eq!(draft.word_count, 5);
        assert_eq!(draft.keyword_density, Some(40.0));
    }

    #[test]
    fn test_issue_severity_filter() {
        let result = AuditResult {
            url: "https://example.com".to_string(),
            overall_score: 80.0,
            issues: vec![
                AuditIssue::new(Severity::Critical, "on_page", "Missing title tag", ""),
                AuditIssue::new(Severity::Warning, "schema", "No JSON-LD schema", ""),
            ],
            technical_seo: AuditSection::default(),
            on_page_seo: AuditSection::default(),
            schema_markup: AuditSection::default(),
            summary: PageSummary::default(),
            pages_crawled: 1,
            crawl_error: None,
        };
        assert_eq!(result.issues_with(Severity::Critical).count(), 1);
        assert_eq!(result.issues_with(Severity::Info).count(), 0);
    }

    #[test]
    fn test_schema_markup_html() {
        let markup = SchemaMarkup::new(json!({"@type": "Article"}));
        assert!(markup.html.starts_with(r#"<script type="application/ld+json">"#));
        assert!(markup.html.contains("Article"));
    }
}
