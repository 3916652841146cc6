//! Orchestrator-facing contracts shared by the engine crate and its callers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meta_ai_common::{
    error::Result,
    types::{AgentId, AgentRecord, Metadata, Priority, Task, TaskId, TaskStatus},
};

/// Top-level orchestrator contract: submit work, observe it, cancel it.
/// Implemented by `meta-ai-orchestrator`'s `MetaAIOrchestrator`.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Submit a new task. Returns immediately with the assigned id; the
    /// task is queued (or held pending its prerequisites) and executed
    /// asynchronously by the worker pool. `metadata` is opaque to the
    /// engine but is what `AdapterParameters::from_metadata` reads
    /// generation overrides (temperature, max_tokens, ...) from.
    async fn submit_task(
        &self,
        task_type: String,
        prompt: String,
        priority: Priority,
        dependencies: Vec<TaskId>,
        metadata: Metadata,
    ) -> Result<TaskId>;

    /// Look up a task by id.
    async fn get_task(&self, task_id: TaskId) -> Result<Task>;

    /// List every task known to the store, regardless of status.
    async fn list_tasks(&self) -> Result<Vec<Task>>;

    /// Register an agent, making it eligible for selection.
    async fn register_agent(&self, agent: AgentRecord) -> Result<()>;

    /// Unregister an agent. If it currently holds a task, that task is
    /// requeued rather than lost.
    async fn unregister_agent(&self, agent_id: &AgentId) -> Result<()>;

    /// List every registered agent.
    async fn list_agents(&self) -> Result<Vec<AgentRecord>>;
}

/// Queue contract used internally by the engine: a priority queue keyed
/// by [`Priority`], FIFO within a priority level.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Enqueue a task id at the given priority. `created_at` is the
    /// task's original submission time, used as the FIFO tie-break so a
    /// requeued task keeps its place relative to tasks submitted after
    /// it rather than jumping to the back of the line.
    async fn push(&self, task_id: TaskId, priority: Priority, created_at: DateTime<Utc>);

    /// Pop the highest-priority, oldest-enqueued task id, if any.
    async fn pop(&self) -> Option<TaskId>;

    /// Current queue depth, by priority.
    async fn len(&self) -> usize;
}

/// Scoring contract used by the worker pool to pick an agent for a task.
/// A pure function over a snapshot of agents: no I/O, no mutation.
pub trait Selector: Send + Sync {
    /// Pick the best-scoring eligible agent for `task_type`, or `None` if
    /// no registered agent is both idle and capable.
    fn select<'a>(&self, task_type: &str, agents: &'a [AgentRecord]) -> Option<&'a AgentRecord>;
}

/// Snapshot of queue/task-store occupancy, reported by the Control API's
/// status endpoint.
#[derive(Debug, Clone, Default)]
pub struct QueueStats {
    pub pending: usize,
    pub assigned: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
}

impl QueueStats {
    pub fn record(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Pending => self.pending += 1,
            TaskStatus::Assigned => self.assigned += 1,
            TaskStatus::InProgress => self.in_progress += 1,
            TaskStatus::Completed => self.completed += 1,
            TaskStatus::Failed => self.failed += 1,
            TaskStatus::Cancelled => {}
        }
    }
}
