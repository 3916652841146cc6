//! Worker pool: a fixed number of concurrent loops, each pulling one
//! ready task at a time, selecting an agent, executing it through the
//! agent's adapter, and folding the outcome back into the task store,
//! agent registry, and metrics aggregator.
//!
//! This is the 7-step loop from the scheduler design: pull (1s timeout),
//! select (requeue + backoff if nobody's eligible), transition to
//! in-progress, execute (60s timeout), record the outcome and retry or
//! terminate, always release the agent.

use crate::registry::AgentRegistry;
use crate::selector::ScoredSelector;
use crate::store::TaskStore;
use crate::watcher::DependencyWatcher;
use crate::{metrics::MetricsAggregator, queue::PriorityTaskQueue};
use meta_ai_common::config::OrchestratorConfig;
use meta_ai_common::metrics::MetricsCollector;
use meta_ai_common::types::{AgentId, ProviderTag, TaskId, TaskStatus};
use meta_ai_core::orchestrator::{Selector, TaskQueue};
use meta_ai_core::provider::ProviderAdapter;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Shared handles every worker loop needs. Cheap to clone (all `Arc`).
pub struct WorkerContext {
    pub registry: Arc<AgentRegistry>,
    pub store: Arc<TaskStore>,
    pub queue: Arc<PriorityTaskQueue>,
    pub watcher: Arc<DependencyWatcher>,
    pub metrics: Arc<MetricsAggregator>,
    pub adapters: Arc<dashmap::DashMap<AgentId, Arc<dyn ProviderAdapter>>>,
    pub config: OrchestratorConfig,
    pub running: Arc<AtomicBool>,
    pub active_tasks: Arc<AtomicU64>,
}

/// Spawn `config.worker_count` worker loops, returning their join handles
/// so the caller can await them at shutdown.
pub fn spawn_pool(ctx: Arc<WorkerContext>) -> Vec<tokio::task::JoinHandle<()>> {
    (0..ctx.config.worker_count)
        .map(|id| {
            let ctx = Arc::clone(&ctx);
            tokio::spawn(run_worker(id, ctx))
        })
        .collect()
}

#[instrument(skip(ctx))]
async fn run_worker(worker_id: usize, ctx: Arc<WorkerContext>) {
    info!(worker_id, "worker started");
    let pull_timeout = Duration::from_millis(ctx.config.queue_pull_timeout_ms);
    let backoff = Duration::from_millis(ctx.config.selector_backoff_ms);
    let execute_timeout = Duration::from_millis(ctx.config.execute_timeout_ms);

    while ctx.running.load(Ordering::SeqCst) {
        // Step 1: pull a ready task, or loop after the pull timeout.
        let Some(task_id) = ctx.queue.pop().await else {
            tokio::time::sleep(pull_timeout).await;
            continue;
        };

        let Some(task) = ctx.store.get(task_id) else {
            warn!(worker_id, %task_id, "popped task no longer in store");
            continue;
        };

        // Step 2: pick an agent. If nobody's eligible, put the task back
        // and back off rather than busy-spinning.
        let snapshot = ctx.registry.snapshot();
        let selector = ScoredSelector;
        let Some(agent) = selector.select(&task.task_type, &snapshot) else {
            ctx.queue.push(task.id, task.priority, task.created_at).await;
            tokio::time::sleep(backoff).await;
            continue;
        };
        let agent_id = agent.id.clone();
        let provider = agent.provider;

        // Step 3: assign, transition to in-progress, record started.
        // `snapshot` was taken without holding the registry lock, so
        // another worker may have claimed this same agent in the
        // meantime; `try_assign` rechecks IDLE and flips to BUSY
        // atomically. If we lost the race, treat it exactly like "no
        // eligible agent" — requeue and back off.
        if !ctx.registry.try_assign(&agent_id, task.id) {
            ctx.queue.push(task.id, task.priority, task.created_at).await;
            tokio::time::sleep(backoff).await;
            continue;
        }
        ctx.store.update(task.id, |t| {
            t.status = TaskStatus::InProgress;
            t.assigned_agent = Some(agent_id.clone());
            t.started_at = Some(chrono::Utc::now());
        });
        ctx.active_tasks.fetch_add(1, Ordering::SeqCst);

        // Step 4: execute through the agent's adapter, 60s ceiling.
        let started = std::time::Instant::now();
        let outcome = execute_task(&ctx, &agent_id, task_id, execute_timeout).await;
        let elapsed = started.elapsed().as_secs_f64();

        match outcome {
            Ok(result) => {
                // Step 5: success path.
                ctx.store.update(task.id, |t| {
                    t.status = TaskStatus::Completed;
                    t.result = Some(result);
                    t.completed_at = Some(chrono::Utc::now());
                });
                ctx.registry.release(&agent_id, elapsed, true);
                ctx.metrics.record(provider, &task.task_type, true, elapsed);
                ctx.watcher.promote_dependents(task.id).await;
            }
            Err(err) => {
                // Step 6: failure path — retry while budget remains and
                // the error is retryable, otherwise terminal FAILED.
                ctx.registry.release(&agent_id, elapsed, false);
                ctx.metrics.record(provider, &task.task_type, false, elapsed);

                let error_message = err.to_string();
                let retryable = err.is_retryable();
                let final_task = ctx.store.update(task.id, |t| {
                    t.error = Some(error_message.clone());
                    if retryable && t.retry_count < t.max_retries {
                        t.retry_count += 1;
                        t.status = TaskStatus::Pending;
                        t.assigned_agent = None;
                        t.started_at = None;
                        t.completed_at = None;
                    } else {
                        t.status = TaskStatus::Failed;
                        t.completed_at = Some(chrono::Utc::now());
                    }
                });

                if let Some(t) = final_task {
                    if t.status == TaskStatus::Pending {
                        debug!(worker_id, %task_id, retry_count = t.retry_count, "requeueing failed task");
                        ctx.queue.push(t.id, t.priority, t.created_at).await;
                    } else {
                        warn!(worker_id, %task_id, %error_message, "task failed permanently");
                    }
                }
            }
        }

        // Step 7: always clear the active gauge on exit from this attempt.
        ctx.active_tasks.fetch_sub(1, Ordering::SeqCst);
        ctx.metrics.collector().set_active_tasks(
            provider.as_str(),
            priority_label(task.priority),
            ctx.active_tasks.load(Ordering::SeqCst) as f64,
        );
    }

    info!(worker_id, "worker stopped");
}

fn priority_label(priority: meta_ai_common::types::Priority) -> &'static str {
    match priority {
        meta_ai_common::types::Priority::Low => "low",
        meta_ai_common::types::Priority::Medium => "medium",
        meta_ai_common::types::Priority::High => "high",
        meta_ai_common::types::Priority::Critical => "critical",
    }
}

async fn execute_task(
    ctx: &WorkerContext,
    agent_id: &AgentId,
    task_id: TaskId,
    execute_timeout: Duration,
) -> meta_ai_common::error::Result<serde_json::Value> {
    let Some(task) = ctx.store.get(task_id) else {
        return Err(meta_ai_common::error::Error::NotFound(format!(
            "task {task_id} vanished mid-execution"
        )));
    };

    // Clone the `Arc` out rather than holding the `DashMap` shard guard
    // across the `await` below — the adapter's own HTTP call may run for
    // up to `execute_timeout`, and another worker may need to touch this
    // shard (e.g. registering a replacement agent) in the meantime.
    let Some(adapter) = ctx.adapters.get(agent_id).map(|entry| Arc::clone(entry.value())) else {
        return Err(meta_ai_common::error::Error::Internal(format!(
            "no adapter registered for agent {agent_id}"
        )));
    };

    match tokio::time::timeout(execute_timeout, adapter.execute(&task.prompt, &task.metadata)).await
    {
        Ok(result) => result,
        Err(_) => Err(meta_ai_common::error::Error::Timeout(format!(
            "agent {agent_id} execute() exceeded {execute_timeout:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsAggregator;
    use async_trait::async_trait;
    use meta_ai_common::metrics::DefaultMetricsCollector;
    use meta_ai_common::types::{AgentRecord, Priority, Task};
    use meta_ai_core::provider::ProviderAdapter;
    use std::collections::{HashMap, HashSet};

    struct AlwaysSucceeds;

    #[async_trait]
    impl ProviderAdapter for AlwaysSucceeds {
        fn provider(&self) -> ProviderTag {
            ProviderTag::Gpt
        }
        async fn initialize(&mut self) -> meta_ai_common::error::Result<bool> {
            Ok(true)
        }
        async fn execute(
            &self,
            prompt: &str,
            _metadata: &meta_ai_common::types::Metadata,
        ) -> meta_ai_common::error::Result<serde_json::Value> {
            Ok(serde_json::json!({ "content": prompt, "model": "stub" }))
        }
        async fn health_check(&self) -> meta_ai_common::error::Result<bool> {
            Ok(true)
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl ProviderAdapter for AlwaysFails {
        fn provider(&self) -> ProviderTag {
            ProviderTag::Gpt
        }
        async fn initialize(&mut self) -> meta_ai_common::error::Result<bool> {
            Ok(true)
        }
        async fn execute(
            &self,
            _prompt: &str,
            _metadata: &meta_ai_common::types::Metadata,
        ) -> meta_ai_common::error::Result<serde_json::Value> {
            Err(meta_ai_common::error::Error::execution("boom"))
        }
        async fn health_check(&self) -> meta_ai_common::error::Result<bool> {
            Ok(true)
        }
    }

    fn context(
        adapter: Arc<dyn ProviderAdapter>,
        worker_count: usize,
    ) -> (Arc<WorkerContext>, TaskId) {
        let registry = Arc::new(AgentRegistry::new());
        let store = Arc::new(TaskStore::new());
        let queue = Arc::new(PriorityTaskQueue::new());
        let watcher = Arc::new(DependencyWatcher::new(Arc::clone(&store), Arc::clone(&queue)));
        let metrics = Arc::new(MetricsAggregator::new(Arc::new(DefaultMetricsCollector)));
        let adapters = Arc::new(dashmap::DashMap::new());

        let agent = AgentRecord::new(
            "a1".to_string(),
            "Agent One".to_string(),
            ProviderTag::Gpt,
            HashSet::from(["general".to_string()]),
            HashMap::new(),
        );
        registry.register(agent);
        adapters.insert("a1".to_string(), adapter);

        let task = Task::new("general".into(), "hello".into(), Priority::Medium, vec![], HashMap::new());
        let task_id = task.id;
        store.insert(task.clone());

        let ctx = Arc::new(WorkerContext {
            registry,
            store,
            queue: Arc::clone(&queue),
            watcher,
            metrics,
            adapters,
            config: OrchestratorConfig {
                worker_count,
                task_queue_capacity: 100,
                default_max_retries: 3,
                queue_pull_timeout_ms: 20,
                execute_timeout_ms: 1000,
                health_check_timeout_ms: 1000,
                dependency_watch_interval_ms: 1000,
                selector_backoff_ms: 20,
            },
            running: Arc::new(AtomicBool::new(true)),
            active_tasks: Arc::new(AtomicU64::new(0)),
        });

        (ctx, task_id)
    }

    #[tokio::test]
    async fn successful_task_completes_and_releases_agent() {
        let (ctx, task_id) = context(Arc::new(AlwaysSucceeds), 1);
        ctx.queue.push(task_id, Priority::Medium, chrono::Utc::now()).await;

        let running = Arc::clone(&ctx.running);
        let handle = tokio::spawn(run_worker(0, Arc::clone(&ctx)));
        tokio::time::sleep(Duration::from_millis(100)).await;
        running.store(false, Ordering::SeqCst);
        let _ = tokio::time::timeout(Duration::from_millis(200), handle).await;

        let task = ctx.store.get(task_id).unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.result.is_some());

        let agent = ctx.registry.get(&"a1".to_string()).unwrap();
        assert_eq!(agent.status, meta_ai_common::types::AgentStatus::Idle);
        assert_eq!(agent.current_task, None);
        assert_eq!(agent.tasks_completed, 1);
    }

    #[tokio::test]
    async fn failing_task_retries_then_terminates() {
        let (ctx, task_id) = context(Arc::new(AlwaysFails), 1);
        ctx.store.update(task_id, |t| t.max_retries = 1);
        ctx.queue.push(task_id, Priority::Medium, chrono::Utc::now()).await;

        let running = Arc::clone(&ctx.running);
        let handle = tokio::spawn(run_worker(0, Arc::clone(&ctx)));
        tokio::time::sleep(Duration::from_millis(300)).await;
        running.store(false, Ordering::SeqCst);
        let _ = tokio::time::timeout(Duration::from_millis(200), handle).await;

        let task = ctx.store.get(task_id).unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.retry_count, 1);

        let agent = ctx.registry.get(&"a1".to_string()).unwrap();
        assert_eq!(agent.tasks_failed, 2);
    }

    /// Counts how many `execute` calls are concurrently in flight; fails
    /// the call itself if more than one overlaps, so a regression of the
    /// select→assign race shows up as a task error rather than a silent
    /// double-dispatch.
    struct ExclusiveSlow {
        in_flight: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl ProviderAdapter for ExclusiveSlow {
        fn provider(&self) -> ProviderTag {
            ProviderTag::Gpt
        }
        async fn initialize(&mut self) -> meta_ai_common::error::Result<bool> {
            Ok(true)
        }
        async fn execute(
            &self,
            prompt: &str,
            _metadata: &meta_ai_common::types::Metadata,
        ) -> meta_ai_common::error::Result<serde_json::Value> {
            let before = self.in_flight.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if before > 0 {
                return Err(meta_ai_common::error::Error::execution(
                    "agent was dispatched to twice concurrently",
                ));
            }
            Ok(serde_json::json!({ "content": prompt, "model": "stub" }))
        }
        async fn health_check(&self) -> meta_ai_common::error::Result<bool> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn two_workers_never_double_assign_one_agent() {
        let (ctx, first_task_id) = context(
            Arc::new(ExclusiveSlow {
                in_flight: std::sync::atomic::AtomicUsize::new(0),
            }),
            2,
        );

        let second_task = Task::new("general".into(), "hello again".into(), Priority::Medium, vec![], HashMap::new());
        let second_task_id = second_task.id;
        ctx.store.insert(second_task);

        ctx.queue.push(first_task_id, Priority::Medium, chrono::Utc::now()).await;
        ctx.queue.push(second_task_id, Priority::Medium, chrono::Utc::now()).await;

        let running = Arc::clone(&ctx.running);
        let handles = spawn_pool(Arc::clone(&ctx));
        tokio::time::sleep(Duration::from_millis(400)).await;
        running.store(false, Ordering::SeqCst);
        for handle in handles {
            let _ = tokio::time::timeout(Duration::from_millis(200), handle).await;
        }

        for id in [first_task_id, second_task_id] {
            let task = ctx.store.get(id).unwrap();
            assert_eq!(task.status, TaskStatus::Completed, "task {id} did not complete cleanly");
        }
        let agent = ctx.registry.get(&"a1".to_string()).unwrap();
        assert_eq!(agent.tasks_completed, 2);
        assert_eq!(agent.tasks_failed, 0, "a double-dispatch would surface as a failure");
    }
}
