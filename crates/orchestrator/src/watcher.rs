//! Dependency watcher: promotes tasks whose prerequisites have all
//! completed from PENDING into the priority queue.
//!
//! Promotion happens two ways: immediately, when the worker pool marks a
//! task COMPLETED (it calls [`DependencyWatcher::promote_dependents`]
//! directly); and as a periodic safety net, scanning every PENDING task
//! with unmet dependencies on a fixed cadence, in case a promotion was
//! missed (e.g. a dependency completed before its dependent was even
//! submitted).

use crate::queue::PriorityTaskQueue;
use crate::store::TaskStore;
use meta_ai_common::types::{TaskId, TaskStatus};
use meta_ai_core::orchestrator::TaskQueue;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct DependencyWatcher {
    store: Arc<TaskStore>,
    queue: Arc<PriorityTaskQueue>,
}

impl DependencyWatcher {
    pub fn new(store: Arc<TaskStore>, queue: Arc<PriorityTaskQueue>) -> Self {
        Self { store, queue }
    }

    /// Primary promotion path: called by the worker pool the instant a
    /// task completes. Enqueues every PENDING task that listed
    /// `completed_task_id` as a prerequisite and whose other
    /// prerequisites are already met — cheaper than a full scan since it
    /// only looks at tasks that could possibly be affected.
    pub async fn promote_dependents(&self, completed_task_id: TaskId) {
        for task in self.store.all() {
            if task.status == TaskStatus::Pending
                && task.dependencies.contains(&completed_task_id)
                && self.store.dependencies_satisfied(&task)
            {
                debug!(task_id = %task.id, completed_task_id = %completed_task_id, "promoting dependent task");
                self.queue.push(task.id, task.priority, task.created_at).await;
            }
        }
    }

    /// Safety-net scan: every PENDING task with unmet dependencies and enqueue the
    /// ones whose prerequisites are now all COMPLETED.
    pub async fn scan_once(&self) {
        for task in self.store.all() {
            if task.status == TaskStatus::Pending
                && task.has_dependencies()
                && self.store.dependencies_satisfied(&task)
            {
                debug!(task_id = %task.id, "dependency watcher promoting task");
                self.queue.push(task.id, task.priority, task.created_at).await;
            }
        }
    }

    /// Run [`Self::scan_once`] forever at `interval`. Spawned once by the
    /// engine at startup.
    pub async fn run(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            self.scan_once().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meta_ai_common::types::Priority;
    use std::collections::HashMap;

    #[tokio::test]
    async fn promotes_task_once_dependency_completes() {
        let store = Arc::new(TaskStore::new());
        let queue = Arc::new(PriorityTaskQueue::new());
        let watcher = DependencyWatcher::new(Arc::clone(&store), Arc::clone(&queue));

        let dep = meta_ai_common::types::Task::new(
            "t".into(),
            "p".into(),
            Priority::Medium,
            vec![],
            HashMap::new(),
        );
        let dep_id = dep.id;
        store.insert(dep);

        let dependent = meta_ai_common::types::Task::new(
            "t".into(),
            "p".into(),
            Priority::Medium,
            vec![dep_id],
            HashMap::new(),
        );
        let dependent_id = dependent.id;
        store.insert(dependent);

        watcher.scan_once().await;
        assert_eq!(queue.len().await, 0, "dependency not yet satisfied");

        store.update(dep_id, |t| t.status = TaskStatus::Completed);
        watcher.scan_once().await;
        assert_eq!(queue.pop().await, Some(dependent_id));
    }

    #[tokio::test]
    async fn promote_dependents_only_enqueues_tasks_naming_the_completed_id() {
        let store = Arc::new(TaskStore::new());
        let queue = Arc::new(PriorityTaskQueue::new());
        let watcher = DependencyWatcher::new(Arc::clone(&store), Arc::clone(&queue));

        let dep = meta_ai_common::types::Task::new(
            "t".into(),
            "p".into(),
            Priority::Medium,
            vec![],
            HashMap::new(),
        );
        let dep_id = dep.id;
        store.insert(dep);
        store.update(dep_id, |t| t.status = TaskStatus::Completed);

        let dependent = meta_ai_common::types::Task::new(
            "t".into(),
            "p".into(),
            Priority::Medium,
            vec![dep_id],
            HashMap::new(),
        );
        let dependent_id = dependent.id;
        store.insert(dependent);

        let unrelated = meta_ai_common::types::Task::new(
            "t".into(),
            "p".into(),
            Priority::Medium,
            vec![],
            HashMap::new(),
        );
        store.insert(unrelated);

        watcher.promote_dependents(dep_id).await;
        assert_eq!(queue.len().await, 1);
        assert_eq!(queue.pop().await, Some(dependent_id));
    }
}
