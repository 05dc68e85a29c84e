//! Task record: one tracked invocation of an agent.
//!
//! # Invariants
//! - `id` is unique for the process lifetime and never changes
//! - `params`, `agent_type` and `created_at` are fixed at creation
//! - `status` only moves forward (see [`TaskStatus`]); terminal states absorb
//! - `results` and `error` are mutually exclusive and each is written at most once
//! - `logs` is append-only and closes once the task is terminal

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Unique identifier for a task.
///
/// # Properties
/// - Globally unique within the process
/// - Immutable once created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Create a new unique task ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::str::FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a task in its lifecycle.
///
/// # State Machine
/// ```text
/// Pending -> Running -> Completed
///        \          \-> Failed
///         \-> Failed
/// ```
/// `Pending -> Failed` only happens when the execution unit dies before it
/// could mark the task running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    /// `true` for Completed and Failed.
    ///
    /// # Property
    /// `is_terminal() => no further transitions`
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

/// Final critic verdict copied onto a content-creation task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticSummary {
    pub score: u8,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,

    /// Agent kind as submitted (may be a value no agent recognizes)
    #[serde(rename = "type")]
    agent_type: String,

    status: TaskStatus,

    params: Value,

    created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    finished_at: Option<DateTime<Utc>>,

    results: Option<Value>,

    error: Option<String>,

    logs: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    critic_score: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    critic_feedback: Option<String>,
}

impl Task {
    /// Create a pending task with a fresh id.
    pub fn new(agent_type: impl Into<String>, params: Value) -> Self {
        Self {
            id: TaskId::new(),
            agent_type: agent_type.into(),
            status: TaskStatus::Pending,
            params,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            results: None,
            error: None,
            logs: Vec::new(),
            critic_score: None,
            critic_feedback: None,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn agent_type(&self) -> &str {
        &self.agent_type
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn params(&self) -> &Value {
        &self.params
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn results(&self) -> Option<&Value> {
        self.results.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn critic_score(&self) -> Option<u8> {
        self.critic_score
    }

    pub fn critic_feedback(&self) -> Option<&str> {
        self.critic_feedback.as_deref()
    }

    /// Append a progress line from the running agent.
    pub fn log(&mut self, line: impl Into<String>) -> Result<(), TaskError> {
        if self.status.is_terminal() {
            return Err(TaskError::LogClosed(self.id));
        }
        self.record(line);
        Ok(())
    }

    fn record(&mut self, line: impl Into<String>) {
        self.logs.push(line.into());
    }

    // State transitions - explicit and validated

    /// Pending -> Running.
    pub fn start(&mut self) -> Result<(), TaskError> {
        self.transition(TaskStatus::Running, |s| s == TaskStatus::Pending)?;
        let now = Utc::now();
        self.started_at = Some(now);
        self.record(format!("Started at {}", timestamp(now)));
        Ok(())
    }

    /// Running -> Completed, storing the result.
    pub fn complete(
        &mut self,
        results: Value,
        critic: Option<CriticSummary>,
    ) -> Result<(), TaskError> {
        self.transition(TaskStatus::Completed, |s| s == TaskStatus::Running)?;
        let now = Utc::now();
        self.finished_at = Some(now);
        self.results = Some(results);
        if let Some(critic) = critic {
            self.critic_score = Some(critic.score);
            self.critic_feedback = Some(critic.feedback);
        }
        self.record(format!("Completed at {}", timestamp(now)));
        Ok(())
    }

    /// Pending/Running -> Failed, storing the error.
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), TaskError> {
        self.transition(TaskStatus::Failed, |s| s.is_active())?;
        let error = error.into();
        self.finished_at = Some(Utc::now());
        self.record(format!("Failed: {}", error));
        self.error = Some(error);
        Ok(())
    }

    fn transition(
        &mut self,
        to: TaskStatus,
        allowed_from: impl Fn(TaskStatus) -> bool,
    ) -> Result<(), TaskError> {
        if !allowed_from(self.status) {
            return Err(TaskError::InvalidTransition {
                id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

/// RFC 3339 with millisecond precision.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Errors that can occur during task operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("Task {0} not found")]
    NotFound(TaskId),

    #[error("Task {0} already exists")]
    AlreadyExists(TaskId),

    #[error("Task {0} has finished; its log is closed")]
    LogClosed(TaskId),

    #[error("Invalid state transition for task {id}: {from:?} -> {to:?}")]
    InvalidTransition {
        id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },
}
