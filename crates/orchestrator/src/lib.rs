#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! The concrete orchestrator engine: wires the agent registry, task
//! store, priority queue, dependency watcher, worker pool and metrics
//! aggregator together behind the [`Orchestrator`] contract that the
//! Control API depends on.

pub mod bootstrap;
pub mod metrics;
pub mod queue;
pub mod registry;
pub mod selector;
pub mod store;
pub mod watcher;
pub mod worker;

use async_trait::async_trait;
use dashmap::DashMap;
use meta_ai_common::config::OrchestratorConfig;
use meta_ai_common::error::{Error, Result};
use meta_ai_common::metrics::MetricsCollector;
use meta_ai_common::types::{
    AgentId, AgentRecord, Metadata, Priority, ProviderTag, Task, TaskId, TaskStatus,
};
use meta_ai_core::orchestrator::{Orchestrator, QueueStats, TaskQueue};
use meta_ai_core::provider::ProviderAdapter;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

pub use metrics::MetricsAggregator;
pub use queue::PriorityTaskQueue;
pub use registry::AgentRegistry;
pub use selector::ScoredSelector;
pub use store::TaskStore;
pub use watcher::DependencyWatcher;
pub use worker::WorkerContext;

/// Handles returned by [`MetaAIOrchestrator::start`], so the caller can
/// join (or simply drop, since all loops respect `running`) at shutdown.
pub struct RunningTasks {
    pub workers: Vec<JoinHandle<()>>,
    pub watcher: JoinHandle<()>,
}

/// The engine: everything the Control API needs to submit, inspect and
/// manage tasks and agents. One instance per process; the core contract
/// it implements ([`Orchestrator`]) is what `meta-ai-api` depends on, so
/// the two crates never need to know about each other's internals.
pub struct MetaAIOrchestrator {
    registry: Arc<AgentRegistry>,
    store: Arc<TaskStore>,
    queue: Arc<PriorityTaskQueue>,
    watcher: Arc<DependencyWatcher>,
    metrics: Arc<MetricsAggregator>,
    adapters: Arc<DashMap<AgentId, Arc<dyn ProviderAdapter>>>,
    config: OrchestratorConfig,
    running: Arc<AtomicBool>,
    active_tasks: Arc<AtomicU64>,
}

impl MetaAIOrchestrator {
    pub fn new(config: OrchestratorConfig, collector: Arc<dyn MetricsCollector>) -> Self {
        let store = Arc::new(TaskStore::new());
        let queue = Arc::new(PriorityTaskQueue::new());
        let watcher = Arc::new(DependencyWatcher::new(Arc::clone(&store), Arc::clone(&queue)));

        Self {
            registry: Arc::new(AgentRegistry::new()),
            store,
            queue,
            watcher,
            metrics: Arc::new(MetricsAggregator::new(collector)),
            adapters: Arc::new(DashMap::new()),
            config,
            running: Arc::new(AtomicBool::new(false)),
            active_tasks: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    pub fn metrics(&self) -> &Arc<MetricsAggregator> {
        &self.metrics
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn active_task_count(&self) -> u64 {
        self.active_tasks.load(Ordering::SeqCst)
    }

    pub async fn queue_size(&self) -> usize {
        self.queue.len().await
    }

    /// Tally every task in the store by status, for `/status` and `/tasks`.
    pub fn queue_stats(&self) -> QueueStats {
        let mut stats = QueueStats::default();
        for task in self.store.all() {
            stats.record(task.status);
        }
        stats
    }

    /// Bind a provider adapter to an agent id. Adapters are owned 1:1 by
    /// their agent (§3), not shared by provider family, so two agents
    /// speaking the same provider each get their own adapter instance.
    pub fn register_adapter(&self, agent_id: AgentId, adapter: Box<dyn ProviderAdapter>) {
        self.adapters.insert(agent_id, Arc::from(adapter));
    }

    /// Start the dependency watcher and the fixed worker pool. Idempotent
    /// only in the sense that calling it twice spawns a second pool —
    /// callers should call it exactly once, at process startup.
    pub fn start(self: &Arc<Self>) -> RunningTasks {
        self.running.store(true, Ordering::SeqCst);

        let watcher = Arc::clone(&self.watcher);
        let watch_interval =
            std::time::Duration::from_millis(self.config.dependency_watch_interval_ms);
        let watcher_handle = tokio::spawn(async move {
            watcher.run(watch_interval).await;
        });

        let worker_ctx = Arc::new(WorkerContext {
            registry: Arc::clone(&self.registry),
            store: Arc::clone(&self.store),
            queue: Arc::clone(&self.queue),
            watcher: Arc::clone(&self.watcher),
            metrics: Arc::clone(&self.metrics),
            adapters: Arc::clone(&self.adapters),
            config: self.config.clone(),
            running: Arc::clone(&self.running),
            active_tasks: Arc::clone(&self.active_tasks),
        });
        let workers = worker::spawn_pool(worker_ctx);

        info!(worker_count = self.config.worker_count, "orchestrator started");

        RunningTasks {
            workers,
            watcher: watcher_handle,
        }
    }

    /// Signal every worker and the watcher to stop after their current
    /// iteration. Tasks already inside `adapter.execute` run to
    /// completion or their 60s ceiling; there is no per-task cancellation.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        info!("orchestrator shutting down");
    }
}

#[async_trait]
impl Orchestrator for MetaAIOrchestrator {
    #[instrument(skip(self))]
    async fn submit_task(
        &self,
        task_type: String,
        prompt: String,
        priority: Priority,
        dependencies: Vec<TaskId>,
        metadata: Metadata,
    ) -> Result<TaskId> {
        for dep in &dependencies {
            if self.store.get(*dep).is_none() {
                return Err(Error::Validation(format!(
                    "prerequisite task {dep} does not exist"
                )));
            }
        }

        let mut task = Task::new(task_type, prompt, priority, dependencies, metadata);
        task.max_retries = self.config.default_max_retries;
        let task_id = task.id;
        let has_dependencies = task.has_dependencies();
        let (created_at, task_priority) = (task.created_at, task.priority);

        self.store.insert(task);

        // Tasks without dependencies go straight on the queue; tasks with
        // dependencies (even already-satisfied ones) are left for the
        // dependency watcher to promote, per §4.4.
        if !has_dependencies {
            self.queue.push(task_id, task_priority, created_at).await;
        }

        Ok(task_id)
    }

    async fn get_task(&self, task_id: TaskId) -> Result<Task> {
        self.store
            .get(task_id)
            .ok_or_else(|| Error::NotFound(format!("task {task_id}")))
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.store.all())
    }

    async fn register_agent(&self, agent: AgentRecord) -> Result<()> {
        self.registry.register(agent);
        Ok(())
    }

    async fn unregister_agent(&self, agent_id: &AgentId) -> Result<()> {
        let held_task = self
            .registry
            .unregister(agent_id)
            .ok_or_else(|| Error::NotFound(format!("agent {agent_id}")))?;
        self.adapters.remove(agent_id);

        if let Some(task_id) = held_task {
            let requeued = self.store.update(task_id, |t| {
                t.status = TaskStatus::Pending;
                t.assigned_agent = None;
                t.started_at = None;
                t.completed_at = None;
            });
            if let Some(task) = requeued {
                warn!(agent_id, %task_id, "unregistered busy agent, requeueing its task");
                self.queue.push(task.id, task.priority, task.created_at).await;
            }
        }

        Ok(())
    }

    async fn list_agents(&self) -> Result<Vec<AgentRecord>> {
        Ok(self.registry.list())
    }
}

/// Default adapter family used when a task's metadata or a request
/// doesn't otherwise pin one down. Exposed for callers (e.g. the `/test`
/// endpoint) that need a sentinel provider tag.
pub const DEFAULT_PROVIDER: ProviderTag = ProviderTag::Gpt;

#[cfg(test)]
mod tests {
    use super::*;
    use meta_ai_common::metrics::DefaultMetricsCollector;
    use std::collections::HashMap;

    fn orchestrator() -> MetaAIOrchestrator {
        MetaAIOrchestrator::new(
            OrchestratorConfig {
                worker_count: 1,
                task_queue_capacity: 100,
                default_max_retries: 3,
                queue_pull_timeout_ms: 10,
                execute_timeout_ms: 1000,
                health_check_timeout_ms: 1000,
                dependency_watch_interval_ms: 1000,
                selector_backoff_ms: 10,
            },
            Arc::new(DefaultMetricsCollector),
        )
    }

    #[tokio::test]
    async fn submit_without_dependencies_enqueues_immediately() {
        let orch = orchestrator();
        let id = orch
            .submit_task("general".into(), "hi".into(), Priority::Medium, vec![], HashMap::new())
            .await
            .unwrap();

        assert_eq!(orch.queue_size().await, 1);
        assert_eq!(orch.get_task(id).await.unwrap().status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn submit_with_missing_dependency_is_rejected() {
        let orch = orchestrator();
        let err = orch
            .submit_task(
                "general".into(),
                "hi".into(),
                Priority::Medium,
                vec![TaskId::new_v4()],
                HashMap::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn submit_with_dependency_does_not_enqueue() {
        let orch = orchestrator();
        let dep = orch
            .submit_task("general".into(), "base".into(), Priority::Medium, vec![], HashMap::new())
            .await
            .unwrap();

        let _dependent = orch
            .submit_task(
                "general".into(),
                "dependent".into(),
                Priority::Medium,
                vec![dep],
                HashMap::new(),
            )
            .await
            .unwrap();

        // Only `dep` is on the queue; the dependent waits for the watcher.
        assert_eq!(orch.queue_size().await, 1);
    }

    #[tokio::test]
    async fn unregistering_busy_agent_requeues_its_task() {
        let orch = orchestrator();
        let agent = AgentRecord::new(
            "a1".to_string(),
            "Agent One".to_string(),
            ProviderTag::Gpt,
            std::collections::HashSet::from(["general".to_string()]),
            HashMap::new(),
        );
        orch.register_agent(agent).await.unwrap();

        let task_id = orch
            .submit_task("general".into(), "hi".into(), Priority::Medium, vec![], HashMap::new())
            .await
            .unwrap();
        orch.registry.try_assign(&"a1".to_string(), task_id);
        orch.store.update(task_id, |t| t.status = TaskStatus::InProgress);
        let _ = orch.queue.pop().await; // simulate the worker having taken it

        orch.unregister_agent(&"a1".to_string()).await.unwrap();

        let task = orch.get_task(task_id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.assigned_agent, None);
        assert_eq!(orch.queue_size().await, 1);
    }
}
