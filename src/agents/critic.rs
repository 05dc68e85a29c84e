//! The critic: an adversarial reviewer that gates drafts on a quality score.
//!
//! # Rules
//! - `iteration > max_iterations`: forced pass with a fixed score, no model call.
//!   This is what bounds the revision loop.
//! - Otherwise the model grades the draft; `passed` is `score >= pass_threshold`
//!   regardless of what the model claims.
//! - An unavailable model or an unparsable reply yields a fixed failing
//!   critique.
//!
//! Only the first `draft_char_limit` characters of a draft are sent.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::CriticConfig;
use crate::llm::structured::{complete_json, or_fallback};
use crate::llm::{ChatMessage, ChatOptions, LlmClient};
use crate::services::ContentBrief;
use crate::util::{flatten_text, null_as_default, score_0_100, truncate_chars};

const FORCED_PASS_FEEDBACK: &str = "Max iterations reached. Manual review recommended.";
const FALLBACK_SCORE: u8 = 85;
const FALLBACK_FEEDBACK: &str = "Add more specific examples and data points.";

/// One evaluation of a draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Critique {
    /// 0-100
    pub score: u8,
    pub passed: bool,
    pub feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hard_feedback: Option<String>,
    pub aeo_issues: Vec<String>,
    /// Pass granted because the iteration budget ran out
    pub forced: bool,
}

impl Critique {
    fn forced_pass(score: u8) -> Self {
        Self {
            score,
            passed: true,
            feedback: FORCED_PASS_FEEDBACK.to_string(),
            hard_feedback: None,
            aeo_issues: Vec::new(),
            forced: true,
        }
    }

    fn fallback() -> Self {
        Self {
            score: FALLBACK_SCORE,
            passed: false,
            feedback: FALLBACK_FEEDBACK.to_string(),
            hard_feedback: None,
            aeo_issues: vec!["Low entity density".to_string()],
            forced: false,
        }
    }

    /// Instructions handed to the reviser.
    pub fn guidance(&self) -> String {
        let mut guidance = format!("Critic feedback: {}", self.feedback);
        if let Some(hard) = self.hard_feedback.as_deref().filter(|h| *h != self.feedback) {
            guidance.push_str("\nMust fix:\n");
            guidance.push_str(hard);
        }
        if !self.aeo_issues.is_empty() {
            guidance.push_str("\nAEO issues: ");
            guidance.push_str(&self.aeo_issues.join("; "));
        }
        guidance
    }
}

/// Audit-trail entry for one critique round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CritiqueRound {
    pub iteration: u32,
    pub score: u8,
    pub feedback: String,
}

/// Raw verdict as the model returns it.
#[derive(Debug, Deserialize)]
struct Verdict {
    #[serde(deserialize_with = "score_0_100")]
    score: u8,
    #[serde(default)]
    feedback: Option<Value>,
    #[serde(default)]
    hard_feedback: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    aeo_issues: Vec<Value>,
}

pub struct Critic {
    llm: Arc<dyn LlmClient>,
    model: String,
    config: CriticConfig,
}

impl Critic {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>, config: CriticConfig) -> Self {
        Self {
            llm,
            model: model.into(),
            config,
        }
    }

    pub fn max_iterations(&self) -> u32 {
        self.config.max_iterations
    }

    /// Evaluate `draft` against `brief` for round `iteration` (1-based).
    pub async fn critique(&self, draft: &str, brief: &ContentBrief, iteration: u32) -> Critique {
        tracing::info!(iteration, "Critic reviewing draft");

        if iteration > self.config.max_iterations {
            tracing::warn!(iteration, "Max iterations reached, forcing pass");
            return Critique::forced_pass(self.config.forced_pass_score);
        }

        let prompt = self.prompt(draft, brief);
        let messages = [
            ChatMessage::system("You are a strict SEO and AEO content editor. Reply with JSON only."),
            ChatMessage::user(prompt),
        ];
        let options = ChatOptions::max_tokens(1200).with_temperature(self.config.temperature);
        let verdict = complete_json::<Verdict>(self.llm.as_ref(), &self.model, &messages, options).await;

        match or_fallback(verdict.map(Some), "critique", || None) {
            Some(verdict) => self.judge(verdict),
            None => Critique::fallback(),
        }
    }

    fn judge(&self, verdict: Verdict) -> Critique {
        let score = verdict.score;
        let hard_feedback = verdict.hard_feedback.and_then(flatten_text);
        let feedback = verdict
            .feedback
            .and_then(flatten_text)
            .or_else(|| hard_feedback.clone())
            .unwrap_or_default();
        Critique {
            score,
            passed: score >= self.config.pass_threshold,
            feedback,
            hard_feedback,
            aeo_issues: verdict.aeo_issues.into_iter().filter_map(flatten_text).collect(),
            forced: false,
        }
    }

    fn prompt(&self, draft: &str, brief: &ContentBrief) -> String {
        let excerpt = truncate_chars(draft, self.config.draft_char_limit);
        let truncated = if excerpt.len() < draft.len() {
            "... (truncated)"
        } else {
            ""
        };
        format!(
            r#"You are the TOUGHEST Editor-in-Chief and SEO Critic.
Your job is to REJECT content that doesn't meet "Citability DNA" standards.

Target Keyword: {keyword}
Target Tone: {tone}

Critique this draft:
{excerpt}{truncated}

Criteria:
1. Entity Density: Are there concrete facts, numbers, and entities? (No fluff)
2. Structure: Are headers clear? Is the answer to the user's query immediate?
3. Citability: Would an AI answer engine cite this as a primary source?
4. Formatting: Proper use of lists, bolding, and schema-ready structure.

Return JSON:
{{
    "score": <0-100>,
    "passed": <true if score >= {threshold}>,
    "hard_feedback": "<bullet points of EXACTLY what to fix. Be specific.>",
    "aeo_issues": ["<list of issues>"]
}}"#,
            keyword = brief.target_keyword.as_deref().unwrap_or("(none)"),
            tone = brief.tone.as_deref().unwrap_or("(unspecified)"),
            threshold = self.config.pass_threshold,
        )
    }
}
