//! FIFO-within-priority task queue.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meta_ai_common::types::{Priority, TaskId};
use meta_ai_core::orchestrator::TaskQueue;
use parking_lot::Mutex;
use priority_queue::PriorityQueue;
use std::cmp::Ordering;

/// Orders by priority first, then by the task's original submission
/// time (older first). Using `created_at` rather than an enqueue-time
/// counter means a requeued task keeps its place in line relative to
/// tasks submitted after it instead of jumping to the back of the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueueKey {
    priority: Priority,
    created_at: DateTime<Utc>,
}

impl Ord for QueueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.priority.cmp(&other.priority) {
            Ordering::Equal => other.created_at.cmp(&self.created_at),
            ord => ord,
        }
    }
}

impl PartialOrd for QueueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue of task ids, backed by a binary heap behind a mutex.
/// `push`/`pop` are synchronous under the lock; the `async_trait` surface
/// exists only to satisfy [`TaskQueue`], matched against how the rest of
/// the engine calls it.
pub struct PriorityTaskQueue {
    inner: Mutex<PriorityQueue<TaskId, QueueKey>>,
}

impl PriorityTaskQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(PriorityQueue::new()),
        }
    }
}

impl Default for PriorityTaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskQueue for PriorityTaskQueue {
    async fn push(&self, task_id: TaskId, priority: Priority, created_at: DateTime<Utc>) {
        self.inner
            .lock()
            .push(task_id, QueueKey { priority, created_at });
    }

    async fn pop(&self) -> Option<TaskId> {
        self.inner.lock().pop().map(|(task_id, _)| task_id)
    }

    async fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn dequeues_by_priority_then_fifo() {
        let queue = PriorityTaskQueue::new();
        let now = Utc::now();
        let low = TaskId::new_v4();
        let high = TaskId::new_v4();
        let high_later = TaskId::new_v4();

        queue.push(low, Priority::Low, now).await;
        queue.push(high, Priority::High, now).await;
        queue
            .push(high_later, Priority::High, now + Duration::seconds(1))
            .await;

        assert_eq!(queue.pop().await, Some(high));
        assert_eq!(queue.pop().await, Some(high_later));
        assert_eq!(queue.pop().await, Some(low));
        assert_eq!(queue.pop().await, None);
    }
}
