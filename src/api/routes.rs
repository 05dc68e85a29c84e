//! Router, handlers and server lifecycle.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::agents::{
    AgentKind, AuditParams, CompetitiveParams, ContentParams, KeywordParams, StrategyParams,
};
use crate::config::Config;
use crate::orchestrator::TaskOrchestrator;
use crate::task::TaskId;

use super::types::*;

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Owns the task store and every background run
    pub orchestrator: TaskOrchestrator,
}

/// Build the router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/agents/seo-audit", post(start_seo_audit))
        .route("/api/agents/content-workflow", post(start_content_workflow))
        .route("/api/agents/keyword-research", post(start_keyword_research))
        .route("/api/agents/competitive-analysis", post(start_competitive_analysis))
        .route("/api/agents/full-strategy", post(start_full_strategy))
        .route("/api/agents/tasks", post(start_task).get(list_tasks))
        .route("/api/agents/status/:task_id", get(get_task_status))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind, serve until SIGINT/SIGTERM, then let running tasks finish.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let orchestrator = TaskOrchestrator::from_config(&config)?;
    let state = Arc::new(AppState {
        config,
        orchestrator,
    });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Listening");
    axum::serve(listener, router(Arc::clone(&state)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(in_flight = state.orchestrator.in_flight(), "Draining tasks");
    state.orchestrator.shutdown().await;
    tracing::info!("Stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("Shutdown requested");
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        llm_enabled: state.config.llm_enabled(),
        model: state.config.default_model.clone(),
        persistent_tasks: state.orchestrator.is_persistent(),
        agents: AgentKind::ALL.iter().map(AgentKind::as_str).collect(),
    })
}

/// Record a task for `kind` with already-validated parameters.
async fn start_typed<P: Serialize>(
    state: &AppState,
    kind: AgentKind,
    params: &P,
    message: &str,
) -> ApiResult<StartTaskResponse> {
    let params = serde_json::to_value(params)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let task_id = state
        .orchestrator
        .start_task(kind.as_str(), params)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(StartTaskResponse {
        success: true,
        task_id,
        message: message.to_string(),
    }))
}

async fn start_seo_audit(
    State(state): State<Arc<AppState>>,
    Json(params): Json<AuditParams>,
) -> ApiResult<StartTaskResponse> {
    start_typed(&state, AgentKind::SeoAudit, &params, "SEO audit agent started").await
}

async fn start_content_workflow(
    State(state): State<Arc<AppState>>,
    Json(params): Json<ContentParams>,
) -> ApiResult<StartTaskResponse> {
    start_typed(
        &state,
        AgentKind::ContentCreation,
        &params,
        "Content creation agent started",
    )
    .await
}

async fn start_keyword_research(
    State(state): State<Arc<AppState>>,
    Json(params): Json<KeywordParams>,
) -> ApiResult<StartTaskResponse> {
    start_typed(
        &state,
        AgentKind::KeywordResearch,
        &params,
        "Keyword research agent started",
    )
    .await
}

async fn start_competitive_analysis(
    State(state): State<Arc<AppState>>,
    Json(params): Json<CompetitiveParams>,
) -> ApiResult<StartTaskResponse> {
    start_typed(
        &state,
        AgentKind::CompetitiveAnalysis,
        &params,
        "Competitive analysis agent started",
    )
    .await
}

async fn start_full_strategy(
    State(state): State<Arc<AppState>>,
    Json(params): Json<StrategyParams>,
) -> ApiResult<StartTaskResponse> {
    start_typed(
        &state,
        AgentKind::FullSeoStrategy,
        &params,
        "Full SEO strategy agent started",
    )
    .await
}

/// Generic start-task. The agent type is resolved by the execution unit, so
/// an unknown type still yields a task id (that task fails).
async fn start_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartTaskRequest>,
) -> ApiResult<StartTaskResponse> {
    let task_id = state
        .orchestrator
        .start_task(&req.agent_type, req.params)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(StartTaskResponse {
        success: true,
        task_id,
        message: format!("{} agent started", req.agent_type),
    }))
}

/// Get a task snapshot.
async fn get_task_status(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> ApiResult<TaskResponse> {
    let not_found = || (StatusCode::NOT_FOUND, "Task not found".to_string());
    let id: TaskId = task_id.parse().map_err(|_| not_found())?;
    let task = state
        .orchestrator
        .get_task_status(id)
        .await
        .ok_or_else(not_found)?;
    Ok(Json(TaskResponse {
        success: true,
        data: task,
    }))
}

/// List all tasks.
async fn list_tasks(State(state): State<Arc<AppState>>) -> Json<TaskListResponse> {
    let tasks = state.orchestrator.list_tasks().await;
    Json(TaskListResponse {
        success: true,
        total: tasks.len(),
        data: tasks,
    })
}
