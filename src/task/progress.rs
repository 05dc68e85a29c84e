//! Progress reporting from a running agent into its task's log.

use std::sync::Arc;

use super::store::TaskStore;
use super::task::TaskId;

/// Cheap, cloneable handle an agent uses to append to its task's `logs`.
///
/// A detached handle (no task behind it) only emits tracing output.
#[derive(Clone, Default)]
pub struct ProgressLog {
    sink: Option<(Arc<dyn TaskStore>, TaskId)>,
}

impl ProgressLog {
    pub fn new(store: Arc<dyn TaskStore>, id: TaskId) -> Self {
        Self {
            sink: Some((store, id)),
        }
    }

    pub fn detached() -> Self {
        Self::default()
    }

    pub async fn log(&self, line: impl Into<String>) {
        let line = line.into();
        match &self.sink {
            Some((store, id)) => {
                tracing::debug!(task_id = %id, "{}", line);
                if let Err(e) = store.append_log(*id, line).await {
                    tracing::warn!(task_id = %id, error = %e, "Dropping progress line");
                }
            }
            None => tracing::debug!("{}", line),
        }
    }
}

impl std::fmt::Debug for ProgressLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.sink {
            Some((_, id)) => write!(f, "ProgressLog({})", id),
            None => write!(f, "ProgressLog(detached)"),
        }
    }
}
