//! Task records and where they live.
//!
//! Lifecycle moves are methods on [`Task`] that reject illegal transitions.
//! The orchestrator only talks to a [`TaskStore`].

mod progress;
mod store;
pub mod task;

pub use progress::ProgressLog;
pub use store::{InMemoryTaskStore, TaskStore};
pub use task::{timestamp, CriticSummary, Task, TaskError, TaskId, TaskStatus};
