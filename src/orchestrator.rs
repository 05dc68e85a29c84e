//! Task orchestrator: fire-and-forget agent runs with pollable status.
//!
//! `start_task` records a Pending task and returns its id at once. The run
//! itself happens in a spawned execution unit:
//!
//! ```text
//! Pending ──start──▶ Running ──┬─▶ Completed (results, critic summary)
//!                              └─▶ Failed    (error)
//! ```
//!
//! A supervisor awaits each execution unit's handle and fails the task if
//! the unit panicked, so every task reaches a terminal state. Both are
//! tracked for [`TaskOrchestrator::shutdown`].

use std::sync::Arc;

use serde_json::Value;
use tokio_util::task::TaskTracker;

use crate::agents::{run_agent, AgentContext, AgentParams, Critic};
use crate::config::Config;
use crate::llm::client_from_config;
use crate::services::{ServiceResult, Services};
use crate::task::{
    CriticSummary, InMemoryTaskStore, ProgressLog, Task, TaskError, TaskId, TaskStore,
};
use crate::util::panic_message;

pub struct TaskOrchestrator {
    store: Arc<dyn TaskStore>,
    context: AgentContext,
    tracker: TaskTracker,
}

impl TaskOrchestrator {
    pub fn new(store: Arc<dyn TaskStore>, services: Services, critic: Arc<Critic>) -> Self {
        Self {
            store,
            context: AgentContext::new(services, critic),
            tracker: TaskTracker::new(),
        }
    }

    /// Production wiring: one LLM client shared by the critic and every
    /// collaborator, tasks held in memory.
    pub fn from_config(config: &Config) -> ServiceResult<Self> {
        let llm = client_from_config(config);
        let services = Services::from_config(config, Arc::clone(&llm))?;
        let critic = Arc::new(Critic::new(
            llm,
            config.default_model.clone(),
            config.critic.clone(),
        ));
        Ok(Self::new(Arc::new(InMemoryTaskStore::new()), services, critic))
    }

    /// Record a Pending task and launch its run in the background.
    ///
    /// `agent_type` is not validated here: an unknown type yields a task
    /// that fails during execution.
    pub async fn start_task(&self, agent_type: &str, params: Value) -> Result<TaskId, TaskError> {
        let task = Task::new(agent_type, params.clone());
        let id = task.id();
        self.store.insert_task(task).await?;
        tracing::info!(task_id = %id, agent = agent_type, "Task submitted");

        self.launch(id, agent_type.to_string(), params);
        Ok(id)
    }

    /// Snapshot of a task, or `None` for an unknown id.
    pub async fn get_task_status(&self, id: TaskId) -> Option<Task> {
        self.store.get_task(id).await
    }

    /// Snapshots of every task held, oldest first.
    pub async fn list_tasks(&self) -> Vec<Task> {
        self.store.list_tasks().await
    }

    pub fn is_persistent(&self) -> bool {
        self.store.is_persistent()
    }

    /// Number of execution units (and supervisors) still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait for every launched task to reach a terminal state.
    pub async fn shutdown(&self) {
        self.tracker.close();
        tracing::info!(in_flight = self.tracker.len(), "Waiting for running tasks");
        self.tracker.wait().await;
    }

    fn launch(&self, id: TaskId, agent_type: String, params: Value) {
        let store = Arc::clone(&self.store);
        let ctx = self
            .context
            .with_progress(ProgressLog::new(Arc::clone(&store), id));

        let unit = self
            .tracker
            .spawn(execute(Arc::clone(&store), id, agent_type, params, ctx));

        self.tracker.spawn(async move {
            let Err(join_error) = unit.await else {
                return;
            };
            let message = if join_error.is_panic() {
                format!("Agent panicked: {}", panic_message(join_error.into_panic().as_ref()))
            } else {
                "Agent execution was cancelled".to_string()
            };
            tracing::error!(task_id = %id, error = %message, "Task execution aborted");
            if let Err(e) = store.fail_task(id, message).await {
                tracing::error!(task_id = %id, error = %e, "Failed to record aborted task");
            }
        });
    }
}

/// One task's execution unit.
async fn execute(
    store: Arc<dyn TaskStore>,
    id: TaskId,
    agent_type: String,
    params: Value,
    ctx: AgentContext,
) {
    if let Err(e) = store.start_task(id).await {
        tracing::error!(task_id = %id, error = %e, "Cannot start task");
        return;
    }
    tracing::info!(task_id = %id, agent = %agent_type, "Task running");

    let outcome = match AgentParams::parse(&agent_type, params) {
        Ok(params) => run_agent(params, &ctx).await,
        Err(e) => Err(e),
    };
    let outcome = outcome.and_then(|output| {
        let critic = output.critic_history().and_then(|history| {
            history.last().map(|round| CriticSummary {
                score: round.score,
                feedback: round.feedback.clone(),
            })
        });
        Ok((output.to_value()?, critic))
    });

    let recorded = match outcome {
        Ok((results, critic)) => {
            tracing::info!(task_id = %id, agent = %agent_type, "Task completed");
            store.complete_task(id, results, critic).await
        }
        Err(e) => {
            tracing::error!(task_id = %id, agent = %agent_type, error = %e, "Task failed");
            store.fail_task(id, e.to_string()).await
        }
    };
    if let Err(e) = recorded {
        tracing::error!(task_id = %id, error = %e, "Failed to record task outcome");
    }
}
