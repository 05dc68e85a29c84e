//! Scripted test doubles for the LLM client and every collaborator trait.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::*;
use crate::llm::{ChatMessage, ChatOptions, ChatResponse, LlmClient, LlmError};

/// LLM client replaying canned replies. The last reply repeats forever.
pub(crate) struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always(reply: impl Into<String>) -> Self {
        Self::new(vec![reply.into()])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn chat_completion(
        &self,
        _model: &str,
        messages: &[ChatMessage],
        _options: ChatOptions,
    ) -> anyhow::Result<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(last) = messages.last() {
            self.prompts.lock().unwrap().push(last.content.clone());
        }

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                replies.pop_front()
            } else {
                replies.front().cloned()
            }
        };
        let content = reply.ok_or_else(|| anyhow::anyhow!("no scripted reply"))?;

        Ok(ChatResponse {
            content: Some(content),
            usage: None,
        })
    }
}

pub(crate) struct StubAuditor {
    pub critical: usize,
}

#[async_trait]
impl SeoAuditor for StubAuditor {
    async fn full_audit(&self, url: &str) -> ServiceResult<AuditResult> {
        let mut issues: Vec<AuditIssue> = (0..self.critical)
            .map(|i| {
                AuditIssue::new(Severity::Critical, "on_page", format!("Critical #{}", i), "stub")
            })
            .collect();
        issues.push(AuditIssue::new(Severity::Warning, "schema", "No JSON-LD schema", "stub"));

        Ok(AuditResult {
            url: url.to_string(),
            overall_score: 80.0,
            issues,
            technical_seo: AuditSection::default(),
            on_page_seo: AuditSection::default(),
            schema_markup: AuditSection::default(),
            summary: PageSummary::default(),
            pages_crawled: 1,
            crawl_error: None,
        })
    }
}

#[derive(Default)]
pub(crate) struct StubContent {
    pub fail_rewrite: bool,
    rewrites: AtomicUsize,
    drafts: AtomicUsize,
}

impl StubContent {
    pub fn failing_rewrites() -> Self {
        Self {
            fail_rewrite: true,
            ..Default::default()
        }
    }

    pub fn rewrites(&self) -> usize {
        self.rewrites.load(Ordering::SeqCst)
    }

    pub fn drafts(&self) -> usize {
        self.drafts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentEngine for StubContent {
    async fn generate_content_brief(&self, _topic: &str, _keyword: &str) -> ServiceResult<ContentBrief> {
        Ok(ContentBrief {
            title: Some("Stub brief".to_string()),
            meta_description: Some("Stub meta description".to_string()),
            tone: Some("expert".to_string()),
            ..Default::default()
        })
    }

    async fn create_outline(&self, topic: &str, _keyword: &str) -> ServiceResult<ContentOutline> {
        Ok(ContentOutline {
            topic: topic.to_string(),
            sections: vec![OutlineSection {
                heading: "Introduction".to_string(),
                ..Default::default()
            }],
            extra: JsonMap::new(),
        })
    }

    async fn generate_titles(&self, keyword: &str, count: usize) -> ServiceResult<Vec<TitleCandidate>> {
        Ok((1..=count)
            .map(|i| TitleCandidate::new(format!("{} title {}", keyword, i)))
            .collect())
    }

    async fn create_content(
        &self,
        topic: &str,
        keyword: &str,
        _word_count: u32,
    ) -> ServiceResult<DraftContent> {
        self.drafts.fetch_add(1, Ordering::SeqCst);
        Ok(DraftContent::from_text(format!("Draft about {}", topic), keyword))
    }

    async fn rewrite_content(
        &self,
        text: &str,
        _style: RewriteStyle,
        _guidance: Option<&str>,
    ) -> ServiceResult<String> {
        self.rewrites.fetch_add(1, Ordering::SeqCst);
        if self.fail_rewrite {
            return Err(LlmError::network_error("stub failure").into());
        }
        Ok(format!("{} [revised]", text))
    }

    async fn generate_schema(&self, schema_type: &str, data: JsonMap) -> ServiceResult<SchemaMarkup> {
        let mut schema = data;
        schema.insert("@type".to_string(), json!(schema_type));
        Ok(SchemaMarkup::new(Value::Object(schema)))
    }
}

pub(crate) struct StubKeywords {
    pub keywords: usize,
    pub long_tail: usize,
}

#[async_trait]
impl KeywordEngine for StubKeywords {
    async fn discover_keywords(&self, seed: &str, limit: usize) -> ServiceResult<KeywordDiscovery> {
        let keywords: Vec<KeywordIdea> = (0..self.keywords.min(limit))
            .map(|i| KeywordIdea {
                keyword: format!("{} {}", seed, i),
                extra: JsonMap::new(),
            })
            .collect();
        Ok(KeywordDiscovery {
            seed_keyword: seed.to_string(),
            total_found: keywords.len(),
            keywords,
            extra: JsonMap::new(),
        })
    }

    async fn find_long_tail(&self, seed: &str, count: usize) -> ServiceResult<LongTailSet> {
        Ok(LongTailSet {
            keyword: seed.to_string(),
            long_tail: (0..self.long_tail.min(count))
                .map(|i| json!(format!("best {} {}", seed, i)))
                .collect(),
            extra: JsonMap::new(),
        })
    }

    async fn find_questions(&self, seed: &str, _count: usize) -> ServiceResult<QuestionSet> {
        Ok(QuestionSet {
            keyword: seed.to_string(),
            questions: vec![json!(format!("What is {}?", seed))],
            extra: JsonMap::new(),
        })
    }

    async fn analyze_serp(&self, keyword: &str) -> ServiceResult<SerpAnalysis> {
        Ok(SerpAnalysis {
            keyword: keyword.to_string(),
            serp_features: vec!["people_also_ask".to_string()],
            extra: JsonMap::new(),
        })
    }

    async fn cluster_keywords(&self, keywords: &[String]) -> ServiceResult<KeywordClusters> {
        Ok(KeywordClusters {
            clusters: vec![KeywordCluster {
                name: "General".to_string(),
                keywords: keywords.to_vec(),
                extra: JsonMap::new(),
            }],
            extra: JsonMap::new(),
        })
    }
}

/// Competitive intel that records the domains it was asked about.
#[derive(Default)]
pub(crate) struct StubCompetitive {
    pub gaps: usize,
    pub analyzed: Mutex<Vec<String>>,
    pub compared: Mutex<Vec<String>>,
}

#[async_trait]
impl CompetitiveIntel for StubCompetitive {
    async fn analyze_competitor(&self, domain: &str) -> ServiceResult<CompetitorProfile> {
        self.analyzed.lock().unwrap().push(domain.to_string());
        Ok(CompetitorProfile {
            domain: domain.to_string(),
            estimated_authority: 42,
            extra: JsonMap::new(),
        })
    }

    async fn compare_domains(
        &self,
        your_domain: &str,
        competitors: &[String],
    ) -> ServiceResult<DomainComparison> {
        *self.compared.lock().unwrap() = competitors.to_vec();
        Ok(DomainComparison {
            your_domain: your_domain.to_string(),
            action_items: vec!["Publish comparison pages".to_string()],
            ..Default::default()
        })
    }

    async fn find_content_gaps(
        &self,
        your_domain: &str,
        _competitors: &[String],
    ) -> ServiceResult<ContentGapReport> {
        Ok(ContentGapReport {
            your_domain: your_domain.to_string(),
            content_gaps: (0..self.gaps)
                .map(|i| ContentGap {
                    topic: format!("gap {}", i),
                    priority: Some("high".to_string()),
                    extra: JsonMap::new(),
                })
                .collect(),
            extra: JsonMap::new(),
        })
    }

    async fn estimate_traffic(&self, domain: &str) -> ServiceResult<TrafficEstimate> {
        Ok(TrafficEstimate {
            domain: domain.to_string(),
            extra: JsonMap::new(),
        })
    }
}

/// Competitive intel whose every call fails.
pub(crate) struct FailingCompetitive;

impl FailingCompetitive {
    fn outage<T>() -> ServiceResult<T> {
        Err(LlmError::network_error("stub outage").into())
    }
}

#[async_trait]
impl CompetitiveIntel for FailingCompetitive {
    async fn analyze_competitor(&self, _domain: &str) -> ServiceResult<CompetitorProfile> {
        Self::outage()
    }

    async fn compare_domains(&self, _d: &str, _c: &[String]) -> ServiceResult<DomainComparison> {
        Self::outage()
    }

    async fn find_content_gaps(&self, _d: &str, _c: &[String]) -> ServiceResult<ContentGapReport> {
        Self::outage()
    }

    async fn estimate_traffic(&self, _domain: &str) -> ServiceResult<TrafficEstimate> {
        Self::outage()
    }
}

pub(crate) struct StubAeo;

#[async_trait]
impl AeoAnalyzer for StubAeo {
    async fn analyze_winning_pattern(&self, _keyword: &str) -> ServiceResult<CitabilityPattern> {
        Ok(CitabilityPattern {
            niche: Some("Testing".to_string()),
            ..Default::default()
        })
    }
}

/// Deterministic collaborators: one critical audit issue, 15 keywords plus
/// 10 long-tail phrases, and two content gaps.
pub(crate) fn stub_services() -> Services {
    Services {
        auditor: Arc::new(StubAuditor { critical: 1 }),
        content: Arc::new(StubContent::default()),
        keywords: Arc::new(StubKeywords {
            keywords: 15,
            long_tail: 10,
        }),
        competitive: Arc::new(StubCompetitive {
            gaps: 2,
            ..Default::default()
        }),
        aeo: Arc::new(StubAeo),
    }
}
