//! Domain types shared across the orchestrator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Task identifier, server-assigned on submission
pub type TaskId = Uuid;

/// Agent identifier, client-chosen at registration time
pub type AgentId = String;

/// Opaque string-keyed metadata carried by tasks and agents
pub type Metadata = HashMap<String, serde_json::Value>;

/// Provider family an agent's adapter is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderTag {
    ClaudeFlow,
    Gpt,
    Gemini,
    Grok,
    Anthropic,
}

impl ProviderTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClaudeFlow => "claude_flow",
            Self::Gpt => "gpt",
            Self::Gemini => "gemini",
            Self::Grok => "grok",
            Self::Anthropic => "anthropic",
        }
    }

    /// Parse the closed set of provider tags, including aliases:
    /// `openai`/`gpt`, `google`/`gemini`, `xai`/`grok`, `anthropic`/`claude`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "claude_flow" => Some(Self::ClaudeFlow),
            "gpt" | "openai" => Some(Self::Gpt),
            "gemini" | "google" => Some(Self::Gemini),
            "grok" | "xai" => Some(Self::Grok),
            "anthropic" | "claude" => Some(Self::Anthropic),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority; higher value dequeues first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl Priority {
    /// Map a submission's free-form priority string. Anything unrecognised
    /// maps to Medium, per the control API's documented default.
    pub fn from_submission(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Medium,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

/// Agent availability status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Idle,
    Busy,
    Error,
    Offline,
    Initializing,
}

/// A unit of work submitted to the orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub task_type: String,
    pub prompt: String,
    pub metadata: Metadata,
    pub priority: Priority,
    pub status: TaskStatus,
    pub dependencies: Vec<TaskId>,
    pub assigned_agent: Option<AgentId>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    pub retry_count: u32,
    pub max_retries: u32,
}

impl Task {
    pub fn new(
        task_type: String,
        prompt: String,
        priority: Priority,
        dependencies: Vec<TaskId>,
        metadata: Metadata,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_type,
            prompt,
            metadata,
            priority,
            status: TaskStatus::Pending,
            dependencies,
            assigned_agent: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
            retry_count: 0,
            max_retries: 3,
        }
    }

    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }
}

/// A registered agent: a logical worker bound to one provider adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    pub name: String,
    pub provider: ProviderTag,
    pub capabilities: HashSet<String>,
    pub status: AgentStatus,
    pub current_task: Option<TaskId>,
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub average_response_time: f64,
    pub last_active: Option<DateTime<Utc>>,
    pub metadata: Metadata,
}

impl AgentRecord {
    pub fn new(
        id: AgentId,
        name: String,
        provider: ProviderTag,
        capabilities: HashSet<String>,
        metadata: Metadata,
    ) -> Self {
        Self {
            id,
            name,
            provider,
            capabilities,
            status: AgentStatus::Idle,
            current_task: None,
            tasks_completed: 0,
            tasks_failed: 0,
            average_response_time: 0.0,
            last_active: None,
            metadata,
        }
    }

    /// `completed / (completed + failed)`, `None` until the agent has
    /// completed at least one task.
    pub fn success_rate(&self) -> Option<f64> {
        if self.tasks_completed == 0 {
            return None;
        }
        Some(self.tasks_completed as f64 / (self.tasks_completed + self.tasks_failed) as f64)
    }

    pub fn is_eligible_for(&self, task_type: &str) -> bool {
        self.status == AgentStatus::Idle
            && (self.capabilities.contains(task_type) || self.capabilities.contains("general"))
    }

    /// Fold one more completion into the running EMA response time.
    pub fn record_completion(&mut self, elapsed_secs: f64, success: bool) {
        if success {
            self.tasks_completed += 1;
            let completed = self.tasks_completed as f64;
            self.average_response_time =
                (self.average_response_time * (completed - 1.0) + elapsed_secs) / completed;
        } else {
            self.tasks_failed += 1;
        }
        self.last_active = Some(Utc::now());
    }
}

/// Running counters for one provider family
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderMetrics {
    pub total_tasks: u64,
    pub successful_tasks: u64,
    pub failed_tasks: u64,
    pub total_time: f64,
    pub average_time: f64,
}

impl ProviderMetrics {
    pub fn record(&mut self, success: bool, elapsed_secs: f64) {
        self.total_tasks += 1;
        if success {
            self.successful_tasks += 1;
        } else {
            self.failed_tasks += 1;
        }
        self.total_time += elapsed_secs;
        self.average_time = self.total_time / self.total_tasks as f64;
    }
}

/// Normalised result returned by a provider adapter on success
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterOutput {
    pub content: String,
    pub model: String,
    #[serde(flatten)]
    pub extra: Metadata,
}

/// Per-call adapter parameters, with the normalisation defaults from the
/// provider contract (temperature 0.7, max_tokens 2000).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterParameters {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: Option<f32>,
    pub system_prompt: Option<String>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
}

impl Default for AdapterParameters {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
            top_p: None,
            system_prompt: None,
            frequency_penalty: None,
            presence_penalty: None,
        }
    }
}

impl AdapterParameters {
    /// Pull the documented overrides out of task/request metadata, falling
    /// back to the contract defaults for anything absent or malformed.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let mut params = Self::default();
        if let Some(v) = metadata.get("temperature").and_then(|v| v.as_f64()) {
            params.temperature = v as f32;
        }
        if let Some(v) = metadata.get("max_tokens").and_then(|v| v.as_u64()) {
            params.max_tokens = v as u32;
        }
        if let Some(v) = metadata.get("top_p").and_then(|v| v.as_f64()) {
            params.top_p = Some(v as f32);
        }
        if let Some(v) = metadata.get("system_prompt").and_then(|v| v.as_str()) {
            params.system_prompt = Some(v.to_string());
        }
        if let Some(v) = metadata.get("frequency_penalty").and_then(|v| v.as_f64()) {
            params.frequency_penalty = Some(v as f32);
        }
        if let Some(v) = metadata.get("presence_penalty").and_then(|v| v.as_f64()) {
            params.presence_penalty = Some(v as f32);
        }
        params
    }
}
