//! Content creation agent: brief, outline, titles, an optional critic-gated
//! draft, and Article schema.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;

use super::critic::CritiqueRound;
use super::revision::RevisionLoop;
use super::types::{AgentError, ContentParams};
use super::{Agent, AgentContext};
use crate::services::{
    ContentBrief, ContentOutline, DraftContent, JsonMap, SchemaMarkup, TitleCandidate,
};

const TITLE_CANDIDATES: usize = 3;

/// The final draft with the critique rounds that shaped it.
#[derive(Debug, Clone, Serialize)]
pub struct RevisedDraft {
    #[serde(flatten)]
    pub draft: DraftContent,
    pub critic_history: Vec<CritiqueRound>,
    pub critic_passed: bool,
    pub forced_pass: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentReport {
    pub brief: ContentBrief,
    pub outline: ContentOutline,
    pub titles: Vec<TitleCandidate>,
    pub content: Option<RevisedDraft>,
    pub schema: SchemaMarkup,
    pub workflow_completed: bool,
}

pub struct ContentCreationAgent;

impl ContentCreationAgent {
    async fn draft(
        &self,
        params: &ContentParams,
        brief: &ContentBrief,
        ctx: &AgentContext,
    ) -> Result<RevisedDraft, AgentError> {
        ctx.progress.log("Generating initial draft...").await;
        let initial = ctx
            .services
            .content
            .create_content(&params.topic, &params.keyword, params.options.word_count)
            .await?;

        let outcome = RevisionLoop::new(&ctx.critic, ctx.services.content.as_ref(), &ctx.progress)
            .run(initial.content, brief)
            .await;
        if outcome.forced {
            ctx.progress
                .log("Max iterations reached. Manual review recommended.")
                .await;
        } else {
            ctx.progress.log("Content passed critic validation").await;
        }

        let mut draft = DraftContent::from_text(outcome.content, &params.keyword);
        draft.extra = initial.extra;
        Ok(RevisedDraft {
            draft,
            critic_history: outcome.critic_history,
            critic_passed: outcome.passed,
            forced_pass: outcome.forced,
        })
    }
}

#[async_trait]
impl Agent for ContentCreationAgent {
    type Params = ContentParams;
    type Output = ContentReport;

    async fn run(&self, params: ContentParams, ctx: &AgentContext) -> Result<ContentReport, AgentError> {
        let services = &ctx.services;

        ctx.progress
            .log(format!("Analyzing AEO DNA for '{}'...", params.keyword))
            .await;
        let aeo_dna = services.aeo.analyze_winning_pattern(&params.keyword).await?;

        let mut brief = services
            .content
            .generate_content_brief(&params.topic, &params.keyword)
            .await?;
        brief.target_keyword = Some(params.keyword.clone());
        brief.aeo_dna = Some(aeo_dna);

        let outline = services.content.create_outline(&params.topic, &params.keyword).await?;
        let titles = services
            .content
            .generate_titles(&params.keyword, TITLE_CANDIDATES)
            .await?;

        let content = if params.options.generate_content {
            Some(self.draft(&params, &brief, ctx).await?)
        } else {
            None
        };

        let mut schema_data = JsonMap::new();
        schema_data.insert(
            "headline".to_string(),
            json!(titles.first().map_or(params.topic.as_str(), |t| t.title.as_str())),
        );
        schema_data.insert(
            "description".to_string(),
            json!(brief.meta_description.as_deref().unwrap_or("Meta description")),
        );
        let schema = services.content.generate_schema("Article", schema_data).await?;

        Ok(ContentReport {
            brief,
            outline,
            titles,
            content,
            schema,
            workflow_completed: true,
        })
    }
}
