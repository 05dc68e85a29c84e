//! HTTP API for the SEO agents.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check
//! - `POST /api/agents/seo-audit` - Start an SEO audit
//! - `POST /api/agents/content-workflow` - Start a content creation run
//! - `POST /api/agents/keyword-research` - Start keyword research
//! - `POST /api/agents/competitive-analysis` - Start a competitive analysis
//! - `POST /api/agents/full-strategy` - Start a full SEO strategy
//! - `POST /api/agents/tasks` - Start any agent by `agent_type`
//! - `GET /api/agents/status/:task_id` - Get task status and results
//! - `GET /api/agents/tasks` - List all tasks

mod routes;
pub mod types;

pub use routes::{router, serve, AppState};
pub use types::*;
