//! Task store: every task ever submitted, keyed by id, never evicted.

use dashmap::DashMap;
use meta_ai_common::types::{Task, TaskId};

pub struct TaskStore {
    tasks: DashMap<TaskId, Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: DashMap::new(),
        }
    }

    pub fn insert(&self, task: Task) {
        self.tasks.insert(task.id, task);
    }

    pub fn get(&self, task_id: TaskId) -> Option<Task> {
        self.tasks.get(&task_id).map(|entry| entry.value().clone())
    }

    pub fn all(&self) -> Vec<Task> {
        self.tasks.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Apply `f` to the stored task in place, if it exists.
    pub fn update<F: FnOnce(&mut Task)>(&self, task_id: TaskId, f: F) -> Option<Task> {
        self.tasks.get_mut(&task_id).map(|mut entry| {
            f(&mut entry);
            entry.value().clone()
        })
    }

    /// Every prerequisite id currently resolves to a stored, completed task.
    pub fn dependencies_satisfied(&self, task: &Task) -> bool {
        task.dependencies.iter().all(|dep| {
            self.tasks
                .get(dep)
                .map(|t| t.status == meta_ai_common::types::TaskStatus::Completed)
                .unwrap_or(false)
        })
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meta_ai_common::types::{Priority, TaskStatus};
    use std::collections::HashMap;

    #[test]
    fn dependencies_satisfied_requires_all_completed() {
        let store = TaskStore::new();
        let dep = Task::new("t".into(), "p".into(), Priority::Medium, vec![], HashMap::new());
        let dep_id = dep.id;
        store.insert(dep);

        let mut task = Task::new("t".into(), "p".into(), Priority::Medium, vec![dep_id], HashMap::new());
        assert!(!store.dependencies_satisfied(&task));

        store.update(dep_id, |t| t.status = TaskStatus::Completed);
        assert!(store.dependencies_satisfied(&task));

        task.dependencies.push(TaskId::new_v4());
        assert!(!store.dependencies_satisfied(&task));
    }
}
