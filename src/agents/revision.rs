//! Critic-gated revision loop.
//!
//! Each round the critic grades the current draft; a rejected draft goes to
//! the reviser with the critic's guidance and the loop continues. The critic
//! forces a pass once the iteration budget is spent, so a run makes at most
//! `max_iterations + 1` critic calls and `max_iterations` reviser calls.

use serde::Serialize;

use super::critic::{Critic, CritiqueRound};
use crate::services::{ContentBrief, ContentEngine, RewriteStyle};
use crate::task::ProgressLog;

/// Final draft plus the audit trail that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct RevisionOutcome {
    pub content: String,
    pub critic_history: Vec<CritiqueRound>,
    pub passed: bool,
    /// The last round was a forced pass
    pub forced: bool,
}

impl RevisionOutcome {
    pub fn final_round(&self) -> Option<&CritiqueRound> {
        self.critic_history.last()
    }
}

pub struct RevisionLoop<'a> {
    critic: &'a Critic,
    reviser: &'a dyn ContentEngine,
    progress: &'a ProgressLog,
}

impl<'a> RevisionLoop<'a> {
    pub fn new(critic: &'a Critic, reviser: &'a dyn ContentEngine, progress: &'a ProgressLog) -> Self {
        Self {
            critic,
            reviser,
            progress,
        }
    }

    /// Drive `draft` through critique rounds until it passes.
    ///
    /// A failing reviser never aborts the loop: the previous draft is kept
    /// and the next round re-grades it.
    pub async fn run(&self, draft: String, brief: &ContentBrief) -> RevisionOutcome {
        let mut content = draft;
        let mut critic_history = Vec::new();

        for iteration in 1..=self.critic.max_iterations().saturating_add(1) {
            let critique = self.critic.critique(&content, brief, iteration).await;
            critic_history.push(CritiqueRound {
                iteration,
                score: critique.score,
                feedback: critique.feedback.clone(),
            });

            if critique.passed {
                tracing::info!(iteration, score = critique.score, forced = critique.forced, "Draft accepted");
                return RevisionOutcome {
                    content,
                    critic_history,
                    passed: true,
                    forced: critique.forced,
                };
            }

            self.progress
                .log(format!("Critic rejected draft (score {}). Revising...", critique.score))
                .await;

            let guidance = critique.guidance();
            match self
                .reviser
                .rewrite_content(&content, RewriteStyle::Improve, Some(&guidance))
                .await
            {
                Ok(revised) if !revised.trim().is_empty() => content = revised,
                Ok(_) => {
                    tracing::warn!(iteration, "Reviser returned empty text, keeping previous draft");
                }
                Err(e) => {
                    tracing::warn!(iteration, error = %e, "Reviser failed, keeping previous draft");
                    self.progress
                        .log(format!("Revision failed ({}). Keeping previous draft.", e))
                        .await;
                }
            }
        }

        // Only reachable if the critic stops forcing a pass past the budget.
        RevisionOutcome {
            content,
            critic_history,
            passed: false,
            forced: false,
        }
    }
}
