//! # SEO Agents
//!
//! Marketing-intelligence backend that runs SEO/AEO analysis agents as
//! background tasks and gates generated content behind an adversarial critic.
//!
//! This library provides:
//! - A task orchestrator with pollable, in-memory task records
//! - Five agent workflows (audit, content, keywords, competitors, strategy)
//! - A critic-gated revision loop for drafted content
//! - An HTTP API for starting and polling tasks
//!
//! ## Architecture
//!
//! ```text
//!   POST /api/agents/...          GET /api/agents/status/:id
//!            │                               ▲
//!            ▼                               │
//!   ┌──────────────────┐  snapshot  ┌────────┴────────┐
//!   │ TaskOrchestrator │───────────▶│    TaskStore    │
//!   └────────┬─────────┘            └─────────────────┘
//!            │ spawn                          ▲ logs / outcome
//!            ▼                                │
//!   ┌──────────────────┐   draft    ┌─────────┴───────┐
//!   │      Agent       │───────────▶│ Critic + Revise │
//!   └────────┬─────────┘            └─────────────────┘
//!            ▼
//!   ┌──────────────────┐
//!   │  Collaborators   │  (LLM-backed engines, HTTP auditor)
//!   └──────────────────┘
//! ```
//!
//! ## Task Flow
//! 1. Receive an agent request via API
//! 2. Record a Pending task and return its id
//! 3. Run the agent in the background, appending progress to the task's logs
//! 4. Store the result (or the error) and the final critic verdict
//!
//! ## Modules
//! - `agents`: agent workflows, critic, revision loop
//! - `api`: HTTP routes
//! - `config`: environment configuration
//! - `llm`: chat-completion client and structured-call-with-fallback
//! - `orchestrator`: task submission and background execution
//! - `services`: collaborator traits and their implementations
//! - `task`: task records, lifecycle, and storage

pub mod agents;
pub mod api;
pub mod config;
pub mod llm;
pub mod orchestrator;
pub mod services;
pub mod task;
pub mod util;

pub use config::Config;
pub use orchestrator::TaskOrchestrator;
