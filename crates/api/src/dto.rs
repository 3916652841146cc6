//! Request/response bodies for the Control API, matching spec §6 exactly.

use meta_ai_common::types::{AgentId, AgentRecord, Metadata, Task, TaskId, TaskStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct RegisterAgentRequest {
    pub agent_id: AgentId,
    pub name: String,
    pub provider: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    pub api_key: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Serialize)]
pub struct RegisterAgentResponse {
    pub success: bool,
    pub agent_id: AgentId,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SimpleResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AgentProjection {
    pub name: String,
    pub provider: String,
    pub status: String,
    pub current_task: Option<TaskId>,
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub average_response_time: f64,
}

impl From<&AgentRecord> for AgentProjection {
    fn from(agent: &AgentRecord) -> Self {
        Self {
            name: agent.name.clone(),
            provider: agent.provider.as_str().to_string(),
            status: format!("{:?}", agent.status).to_lowercase(),
            current_task: agent.current_task,
            tasks_completed: agent.tasks_completed,
            tasks_failed: agent.tasks_failed,
            average_response_time: agent.average_response_time,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AgentsResponse {
    pub agents: HashMap<AgentId, AgentProjection>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitTaskRequest {
    pub task_type: String,
    pub prompt: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Serialize)]
pub struct SubmitTaskResponse {
    pub task_id: TaskId,
    pub status: String,
    pub message: String,
}

/// Projection of a [`Task`] returned by `GET /tasks/{task_id}`, identical
/// in shape to the stored record.
#[derive(Debug, Serialize)]
pub struct TaskProjection {
    pub id: TaskId,
    pub task_type: String,
    pub prompt: String,
    pub priority: String,
    pub status: String,
    pub dependencies: Vec<TaskId>,
    pub assigned_agent: Option<AgentId>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    pub retry_count: u32,
    pub max_retries: u32,
}

impl From<&Task> for TaskProjection {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            task_type: task.task_type.clone(),
            prompt: task.prompt.clone(),
            priority: format!("{:?}", task.priority).to_lowercase(),
            status: status_label(task.status).to_string(),
            dependencies: task.dependencies.clone(),
            assigned_agent: task.assigned_agent.clone(),
            created_at: task.created_at,
            started_at: task.started_at,
            completed_at: task.completed_at,
            result: task.result.clone(),
            error: task.error.clone(),
            retry_count: task.retry_count,
            max_retries: task.max_retries,
        }
    }
}

pub fn status_label(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::Assigned => "assigned",
        TaskStatus::InProgress => "in_progress",
        TaskStatus::Completed => "completed",
        TaskStatus::Failed => "failed",
        TaskStatus::Cancelled => "cancelled",
    }
}

#[derive(Debug, Serialize)]
pub struct TasksAggregateResponse {
    pub total: usize,
    pub pending: usize,
    pub assigned: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthOrchestratorSection {
    pub running: bool,
    pub agents_count: usize,
    pub tasks_count: usize,
    pub queue_size: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub orchestrator: HealthOrchestratorSection,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub orchestrator: HealthOrchestratorSection,
    pub tasks: TasksAggregateResponse,
    pub active_tasks: u64,
    pub performance_metrics: HashMap<String, ProviderMetricsProjection>,
}

#[derive(Debug, Serialize)]
pub struct ProviderMetricsProjection {
    pub total_tasks: u64,
    pub successful_tasks: u64,
    pub failed_tasks: u64,
    pub total_time: f64,
    pub average_time: f64,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub metrics: HashMap<String, ProviderMetricsProjection>,
}

#[derive(Debug, Serialize)]
pub struct TestResponse {
    pub message: String,
    pub task_id: TaskId,
    pub task_status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
