//! Task storage.
//!
//! The orchestrator owns one store. The in-memory backend is the only one
//! shipped; a durable backend must keep the [`Task`] schema and enforce the
//! same lifecycle transitions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::task::{CriticSummary, Task, TaskError, TaskId};

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Whether tasks survive a restart.
    fn is_persistent(&self) -> bool;

    async fn insert_task(&self, task: Task) -> Result<(), TaskError>;

    async fn get_task(&self, id: TaskId) -> Option<Task>;

    /// All tasks, oldest first.
    async fn list_tasks(&self) -> Vec<Task>;

    async fn start_task(&self, id: TaskId) -> Result<(), TaskError>;

    async fn complete_task(
        &self,
        id: TaskId,
        results: Value,
        critic: Option<CriticSummary>,
    ) -> Result<(), TaskError>;

    async fn fail_task(&self, id: TaskId, error: String) -> Result<(), TaskError>;

    /// Rejected with `TaskError::LogClosed` once the task is terminal.
    async fn append_log(&self, id: TaskId, line: String) -> Result<(), TaskError>;
}

/// In-memory task store (non-persistent).
#[derive(Clone, Default)]
pub struct InMemoryTaskStore {
    tasks: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn with_task<F>(&self, id: TaskId, f: F) -> Result<(), TaskError>
    where
        F: FnOnce(&mut Task) -> Result<(), TaskError> + Send,
    {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(&id).ok_or(TaskError::NotFound(id))?;
        f(task)
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn insert_task(&self, task: Task) -> Result<(), TaskError> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id()) {
            return Err(TaskError::AlreadyExists(task.id()));
        }
        tasks.insert(task.id(), task);
        Ok(())
    }

    async fn get_task(&self, id: TaskId) -> Option<Task> {
        self.tasks.read().await.get(&id).cloned()
    }

    async fn list_tasks(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.read().await.values().cloned().collect();
        tasks.sort_by_key(|t| t.created_at());
        tasks
    }

    async fn start_task(&self, id: TaskId) -> Result<(), TaskError> {
        self.with_task(id, |task| task.start()).await
    }

    async fn complete_task(
        &self,
        id: TaskId,
        results: Value,
        critic: Option<CriticSummary>,
    ) -> Result<(), TaskError> {
        self.with_task(id, move |task| task.complete(results, critic))
            .await
    }

    async fn fail_task(&self, id: TaskId, error: String) -> Result<(), TaskError> {
        self.with_task(id, move |task| task.fail(error)).await
    }

    async fn append_log(&self, id: TaskId, line: String) -> Result<(), TaskError> {
        self.with_task(id, move |task| task.log(line)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;
    use serde_json::json;

    #[tokio::test]
    async fn test_in_memory_lifecycle() {
        let store = InMemoryTaskStore::new();
        assert!(!store.is_persistent());

        let task = Task::new("seo_audit", json!({"url": "example.com"}));
        let id = task.id();
        store.insert_task(task).await.expect("insert");

        store.start_task(id).await.expect("start");
        store
            .append_log(id, "working".to_string())
            .await
            .expect("log");
        store
            .complete_task(id, json!({"done": true}), None)
            .await
            .expect("complete");

        let snapshot = store.get_task(id).await.expect("task exists");
        assert_eq!(snapshot.status(), TaskStatus::Completed);
        assert_eq!(snapshot.logs().len(), 3);
        assert_eq!(snapshot.logs()[1], "working");
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let store = InMemoryTaskStore::new();
        let id = TaskId::new();
        assert!(store.get_task(id).await.is_none());
        assert_eq!(store.start_task(id).await, Err(TaskError::NotFound(id)));
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = InMemoryTaskStore::new();
        let task = Task::new("seo_audit", json!({}));
        store.insert_task(task.clone()).await.expect("first insert");
        assert_eq!(
            store.insert_task(task.clone()).await,
            Err(TaskError::AlreadyExists(task.id()))
        );
    }

    #[tokio::test]
    async fn test_list_is_oldest_first() {
        let store = InMemoryTaskStore::new();
        let mut ids = Vec::new();
        for _ in 0..3 {
            let task = Task::new("keyword_research", json!({}));
            ids.push(task.id());
            store.insert_task(task).await.expect("insert");
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        let listed: Vec<TaskId> = store.list_tasks().await.iter().map(|t| t.id()).collect();
        assert_eq!(listed, ids);
    }
}
