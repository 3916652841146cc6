//! Agent registry: the set of agents eligible for task selection.

use dashmap::DashMap;
use meta_ai_common::types::{AgentId, AgentRecord, AgentStatus, TaskId};
use tracing::warn;

/// Read-mostly store of registered agents, keyed by client-chosen id.
/// Registration and lookups are lock-free (`DashMap` shards internally);
/// the worker pool takes a full snapshot via [`Self::snapshot`] before
/// running the selector so scoring never races a concurrent mutation.
pub struct AgentRegistry {
    agents: DashMap<AgentId, AgentRecord>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: DashMap::new(),
        }
    }

    /// Register an agent. Re-registering an id overwrites the previous
    /// record and logs a warning, rather than erroring — operators are
    /// expected to be able to replace a misbehaving agent's registration
    /// without first unregistering it.
    pub fn register(&self, agent: AgentRecord) {
        if self.agents.contains_key(&agent.id) {
            warn!(agent_id = %agent.id, "overwriting existing agent registration");
        }
        self.agents.insert(agent.id.clone(), agent);
    }

    /// Unregister an agent, returning the task id it was holding (if
    /// any) so the caller can requeue it. Returns `None` if the agent
    /// wasn't registered.
    pub fn unregister(&self, agent_id: &AgentId) -> Option<Option<TaskId>> {
        self.agents.remove(agent_id).map(|(_, agent)| agent.current_task)
    }

    pub fn get(&self, agent_id: &AgentId) -> Option<AgentRecord> {
        self.agents.get(agent_id).map(|entry| entry.value().clone())
    }

    pub fn list(&self) -> Vec<AgentRecord> {
        self.agents.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Snapshot used by the selector: a plain `Vec` so scoring runs over
    /// an immutable slice with no lock held during the scan.
    pub fn snapshot(&self) -> Vec<AgentRecord> {
        self.list()
    }

    /// Atomically check-and-assign: flips the agent to BUSY with
    /// `task_id` only if it is still IDLE, in one `DashMap` entry guard
    /// so the check and the mutation never straddle another worker's
    /// assignment. Returns `false` (no mutation) if the agent is
    /// unregistered or no longer IDLE — the selector's snapshot is taken
    /// without holding a lock, so by the time a worker tries to assign,
    /// another worker may already have claimed the same agent.
    pub fn try_assign(&self, agent_id: &AgentId, task_id: TaskId) -> bool {
        let Some(mut agent) = self.agents.get_mut(agent_id) else {
            return false;
        };
        if agent.status != AgentStatus::Idle {
            return false;
        }
        agent.status = AgentStatus::Busy;
        agent.current_task = Some(task_id);
        true
    }

    /// Clear an agent's current task and fold the completion into its
    /// running stats, called once the worker pool finishes executing.
    pub fn release(&self, agent_id: &AgentId, elapsed_secs: f64, success: bool) {
        if let Some(mut agent) = self.agents.get_mut(agent_id) {
            agent.status = AgentStatus::Idle;
            agent.current_task = None;
            agent.record_completion(elapsed_secs, success);
        }
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meta_ai_common::types::ProviderTag;
    use std::collections::HashMap;
    use std::collections::HashSet;

    fn sample_agent(id: &str) -> AgentRecord {
        AgentRecord::new(
            id.to_string(),
            id.to_string(),
            ProviderTag::Gpt,
            HashSet::from(["general".to_string()]),
            HashMap::new(),
        )
    }

    #[test]
    fn unregister_returns_held_task() {
        let registry = AgentRegistry::new();
        registry.register(sample_agent("a1"));
        let task_id = TaskId::new_v4();
        assert!(registry.try_assign(&"a1".to_string(), task_id));

        let held = registry.unregister(&"a1".to_string());
        assert_eq!(held, Some(Some(task_id)));
        assert!(registry.get(&"a1".to_string()).is_none());
    }

    #[test]
    fn unregister_unknown_agent_returns_none() {
        let registry = AgentRegistry::new();
        assert_eq!(registry.unregister(&"missing".to_string()), None);
    }

    #[test]
    fn try_assign_fails_on_unregistered_agent() {
        let registry = AgentRegistry::new();
        assert!(!registry.try_assign(&"missing".to_string(), TaskId::new_v4()));
    }

    #[test]
    fn try_assign_fails_when_already_busy() {
        let registry = AgentRegistry::new();
        registry.register(sample_agent("a1"));
        assert!(registry.try_assign(&"a1".to_string(), TaskId::new_v4()));
        assert!(!registry.try_assign(&"a1".to_string(), TaskId::new_v4()));
    }
}
