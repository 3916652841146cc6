//! One handler per endpoint in spec §6. Each validates its input, calls
//! into [`MetaAIOrchestrator`] through the [`Orchestrator`] contract, and
//! maps domain errors to HTTP status codes via [`ApiError`].

use crate::dto::*;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use meta_ai_common::config::AgentConfig;
use meta_ai_common::error::Error;
use meta_ai_common::types::{AgentId, AgentRecord, Priority, ProviderTag, TaskId};
use meta_ai_core::orchestrator::Orchestrator;
use secrecy::Secret;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{info, warn};

/// Wraps a domain [`Error`] so it can be returned directly from a handler;
/// the status code comes from `Error::status_code`, the body is a plain
/// `{error}` JSON object.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        warn!(error = %self.0, %status, "request failed");
        (status, Json(ErrorResponse { error: self.0.to_string() })).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Both `/health` and the `orchestrator` section of `/status` share this
/// snapshot; `GET /health` never errors, it just reports `unhealthy` in
/// its body if the orchestrator hasn't started. `queue_size` is the
/// engine's actual priority-heap depth, not a derived task-status count —
/// a PENDING task with unmet dependencies is never on the heap (§4.4), so
/// counting task-store statuses would overreport it.
async fn orchestrator_snapshot(
    state: &AppState,
) -> (bool, HealthOrchestratorSection, TasksAggregateResponse) {
    let stats = state.orchestrator.queue_stats();
    let agents_count = state.orchestrator.registry().list().len();
    let tasks = state.orchestrator.store().all();
    let tasks_count = tasks.len();
    let running = state.orchestrator.is_running();
    let queue_size = state.orchestrator.queue_size().await;

    let section = HealthOrchestratorSection {
        running,
        agents_count,
        tasks_count,
        queue_size,
    };
    let aggregate = TasksAggregateResponse {
        total: tasks_count,
        pending: stats.pending,
        assigned: stats.assigned,
        in_progress: stats.in_progress,
        completed: stats.completed,
        failed: stats.failed,
    };
    (running, section, aggregate)
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (running, section, _) = orchestrator_snapshot(&state).await;
    Json(HealthResponse {
        status: if running { "healthy" } else { "starting" },
        orchestrator: section,
    })
}

pub async fn list_agents(State(state): State<AppState>) -> ApiResult<Json<AgentsResponse>> {
    if !state.orchestrator.is_running() {
        return Err(Error::ServiceNotReady.into());
    }
    let agents = state
        .orchestrator
        .list_agents()
        .await?
        .iter()
        .map(|agent| (agent.id.clone(), AgentProjection::from(agent)))
        .collect();
    Ok(Json(AgentsResponse { agents }))
}

pub async fn register_agent(
    State(state): State<AppState>,
    Json(request): Json<RegisterAgentRequest>,
) -> ApiResult<(StatusCode, Json<RegisterAgentResponse>)> {
    let provider = ProviderTag::parse(&request.provider)
        .ok_or_else(|| Error::Validation(format!("unknown provider: {}", request.provider)))?;

    if request.agent_id.trim().is_empty() {
        return Err(Error::Validation("agent_id must not be empty".to_string()).into());
    }

    let agent_config = AgentConfig {
        api_key: request.api_key.map(Secret::new),
        base_url: meta_ai_common::config::default_base_url(provider),
        model: meta_ai_common::config::default_model(provider),
        enabled: true,
    };

    let mut adapter = meta_ai_agents::create_adapter(provider, &agent_config);
    match adapter.initialize().await {
        Ok(true) => {}
        Ok(false) => {
            return Err(Error::ProviderUnavailable(format!(
                "adapter for {provider} failed to initialize"
            ))
            .into())
        }
        Err(err) => {
            return Err(Error::ProviderUnavailable(format!(
                "adapter for {provider} failed to initialize: {err}"
            ))
            .into())
        }
    }

    state.orchestrator.register_adapter(request.agent_id.clone(), adapter);

    let capabilities: HashSet<String> = request.capabilities.into_iter().collect();
    let agent = AgentRecord::new(
        request.agent_id.clone(),
        request.name,
        provider,
        capabilities,
        request.metadata,
    );
    state.orchestrator.register_agent(agent).await?;

    info!(agent_id = %request.agent_id, %provider, "agent registered via control API");

    Ok((
        StatusCode::CREATED,
        Json(RegisterAgentResponse {
            success: true,
            agent_id: request.agent_id,
            message: "Agent registered successfully".to_string(),
        }),
    ))
}

pub async fn unregister_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<AgentId>,
) -> ApiResult<Json<SimpleResponse>> {
    state.orchestrator.unregister_agent(&agent_id).await?;
    Ok(Json(SimpleResponse {
        success: true,
        message: format!("Agent {agent_id} unregistered"),
    }))
}

pub async fn submit_task(
    State(state): State<AppState>,
    Json(request): Json<SubmitTaskRequest>,
) -> ApiResult<(StatusCode, Json<SubmitTaskResponse>)> {
    if request.task_type.trim().is_empty() {
        return Err(Error::Validation("task_type must not be empty".to_string()).into());
    }
    if request.prompt.trim().is_empty() {
        return Err(Error::Validation("prompt must not be empty".to_string()).into());
    }

    let priority = request
        .priority
        .as_deref()
        .map(Priority::from_submission)
        .unwrap_or_default();

    let task_id = state
        .orchestrator
        .submit_task(
            request.task_type,
            request.prompt,
            priority,
            request.dependencies,
            request.metadata,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitTaskResponse {
            task_id,
            status: "submitted".to_string(),
            message: "Task submitted successfully".to_string(),
        }),
    ))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<TaskId>,
) -> ApiResult<Json<TaskProjection>> {
    let task = state.orchestrator.get_task(task_id).await?;
    Ok(Json(TaskProjection::from(&task)))
}

pub async fn list_tasks_aggregate(
    State(state): State<AppState>,
) -> ApiResult<Json<TasksAggregateResponse>> {
    if !state.orchestrator.is_running() {
        return Err(Error::ServiceNotReady.into());
    }
    let (_, _, aggregate) = orchestrator_snapshot(&state).await;
    Ok(Json(aggregate))
}

fn metrics_projection(state: &AppState) -> HashMap<String, ProviderMetricsProjection> {
    state
        .orchestrator
        .metrics()
        .snapshot_all()
        .into_iter()
        .map(|(provider, metrics)| {
            (
                provider.as_str().to_string(),
                ProviderMetricsProjection {
                    total_tasks: metrics.total_tasks,
                    successful_tasks: metrics.successful_tasks,
                    failed_tasks: metrics.failed_tasks,
                    total_time: metrics.total_time,
                    average_time: metrics.average_time,
                },
            )
        })
        .collect()
}

pub async fn status(State(state): State<AppState>) -> ApiResult<Json<StatusResponse>> {
    if !state.orchestrator.is_running() {
        return Err(Error::ServiceNotReady.into());
    }
    let (_, section, aggregate) = orchestrator_snapshot(&state).await;
    Ok(Json(StatusResponse {
        status: "healthy",
        orchestrator: section,
        tasks: aggregate,
        active_tasks: state.orchestrator.active_task_count(),
        performance_metrics: metrics_projection(&state),
    }))
}

pub async fn metrics(State(state): State<AppState>) -> ApiResult<Json<MetricsResponse>> {
    if !state.orchestrator.is_running() {
        return Err(Error::ServiceNotReady.into());
    }
    Ok(Json(MetricsResponse {
        metrics: metrics_projection(&state),
    }))
}

/// Submits a canned `code_generation` task and waits a fixed 2s before
/// reporting its status, per spec §6 — a smoke test for the whole pipeline
/// rather than a synchronous execution path.
pub async fn test(State(state): State<AppState>) -> ApiResult<Json<TestResponse>> {
    if !state.orchestrator.is_running() {
        return Err(Error::ServiceNotReady.into());
    }

    let task_id = state
        .orchestrator
        .submit_task(
            "code_generation".to_string(),
            "Write a function that returns the string 'hello world'".to_string(),
            Priority::Medium,
            Vec::new(),
            HashMap::from([("test".to_string(), serde_json::Value::Bool(true))]),
        )
        .await?;

    tokio::time::sleep(Duration::from_secs(2)).await;

    let task_status = state
        .orchestrator
        .get_task(task_id)
        .await
        .map(|task| status_label(task.status).to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    Ok(Json(TestResponse {
        message: "Test orchestration initiated".to_string(),
        task_id,
        task_status,
    }))
}
