//! API request and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::task::{Task, TaskId};

/// Generic start-task request.
#[derive(Debug, Clone, Deserialize)]
pub struct StartTaskRequest {
    /// One of the agent wire names (`seo_audit`, `content_creation`, ...)
    pub agent_type: String,

    /// Agent-specific parameters
    #[serde(default)]
    pub params: Value,
}

/// Response after starting a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartTaskResponse {
    pub success: bool,

    /// Id to poll with `GET /api/agents/status/:task_id`
    pub task_id: TaskId,

    pub message: String,
}

/// One task snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct TaskResponse {
    pub success: bool,
    pub data: Task,
}

/// All task snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct TaskListResponse {
    pub success: bool,
    pub data: Vec<Task>,
    pub total: usize,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always "ok"
    pub status: String,

    /// Crate version
    pub version: String,

    /// Whether an LLM credential is configured (otherwise collaborators fall back)
    pub llm_enabled: bool,

    /// Model used for completions
    pub model: String,

    /// Whether tasks survive a restart
    pub persistent_tasks: bool,

    /// Accepted `agent_type` values
    pub agents: Vec<&'static str>,
}
