//! SEO audit agent.

use async_trait::async_trait;
use serde::Serialize;

use super::types::{AgentError, AuditParams};
use super::{Agent, AgentContext};
use crate::services::{AuditIssue, AuditResult, Severity};

/// Number of critical issues surfaced as priority fixes.
const PRIORITY_FIXES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    Good,
    NeedsAttention,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditSummary {
    pub critical_issues: usize,
    pub warnings: usize,
    pub overall_health: Health,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub audit: AuditResult,
    /// Distinct recommendations attached to critical and warning findings
    pub recommendations: Vec<String>,
    pub priority_fixes: Vec<AuditIssue>,
    pub summary: AuditSummary,
}

impl AuditReport {
    /// Partition the audit's findings by severity.
    pub fn from_audit(audit: AuditResult) -> Self {
        let critical: Vec<&AuditIssue> = audit.issues_with(Severity::Critical).collect();
        let warnings = audit.issues_with(Severity::Warning).count();

        let summary = AuditSummary {
            critical_issues: critical.len(),
            warnings,
            overall_health: if critical.is_empty() {
                Health::Good
            } else {
                Health::NeedsAttention
            },
        };
        let priority_fixes = critical
            .into_iter()
            .take(PRIORITY_FIXES)
            .cloned()
            .collect();

        let mut recommendations: Vec<String> = Vec::new();
        for issue in audit.issues.iter().filter(|i| i.severity != Severity::Info) {
            if let Some(rec) = &issue.recommendation {
                if !recommendations.contains(rec) {
                    recommendations.push(rec.clone());
                }
            }
        }

        Self {
            audit,
            recommendations,
            priority_fixes,
            summary,
        }
    }
}

pub struct SeoAuditAgent;

#[async_trait]
impl Agent for SeoAuditAgent {
    type Params = AuditParams;
    type Output = AuditReport;

    async fn run(&self, params: AuditParams, ctx: &AgentContext) -> Result<AuditReport, AgentError> {
        ctx.progress.log(format!("Auditing {}", params.url)).await;
        let audit = ctx.services.auditor.full_audit(&params.url).await?;
        let report = AuditReport::from_audit(audit);
        tracing::info!(
            url = %params.url,
            critical = report.summary.critical_issues,
            warnings = report.summary.warnings,
            "Audit finished"
        );
        Ok(report)
    }
}
