//! Capability- and score-based agent selection.

use meta_ai_common::types::AgentRecord;
use meta_ai_core::orchestrator::Selector;

/// Default, and only, selector: scores every eligible agent and returns
/// the highest, breaking ties by ascending agent id so selection is
/// deterministic given identical agent state.
///
/// Score = capability match (+10 exact, +5 via `general`)
///       + success_rate * 5
///       + (1 / average_response_time) * 2   (0 if never completed a task)
///       - tasks_completed * 0.1
pub struct ScoredSelector;

impl ScoredSelector {
    fn score(task_type: &str, agent: &AgentRecord) -> f64 {
        let capability_score = if agent.capabilities.contains(task_type) {
            10.0
        } else {
            5.0 // eligibility already required "general" to reach here
        };

        let success_score = agent.success_rate().unwrap_or(0.0) * 5.0;

        let latency_score = if agent.average_response_time > 0.0 {
            (1.0 / agent.average_response_time) * 2.0
        } else {
            0.0
        };

        let volume_penalty = agent.tasks_completed as f64 * 0.1;

        capability_score + success_score + latency_score - volume_penalty
    }
}

impl Selector for ScoredSelector {
    fn select<'a>(&self, task_type: &str, agents: &'a [AgentRecord]) -> Option<&'a AgentRecord> {
        agents
            .iter()
            .filter(|agent| agent.is_eligible_for(task_type))
            .min_by(|a, b| {
                let score_a = Self::score(task_type, a);
                let score_b = Self::score(task_type, b);
                // Highest score wins; ties broken by ascending agent id.
                score_b
                    .partial_cmp(&score_a)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.id.cmp(&b.id))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meta_ai_common::types::ProviderTag;
    use std::collections::{HashMap, HashSet};

    fn agent(id: &str, capabilities: &[&str]) -> AgentRecord {
        AgentRecord::new(
            id.to_string(),
            id.to_string(),
            ProviderTag::Gpt,
            capabilities.iter().map(|s| s.to_string()).collect(),
            HashMap::new(),
        )
    }

    #[test]
    fn prefers_exact_capability_match_over_general() {
        let exact = agent("exact", &["coding"]);
        let general = agent("general_agent", &["general"]);
        let agents = vec![general, exact];

        let selector = ScoredSelector;
        let chosen = selector.select("coding", &agents).unwrap();
        assert_eq!(chosen.id, "exact");
    }

    #[test]
    fn ignores_busy_agents() {
        let mut busy = agent("busy", &["coding"]);
        busy.status = meta_ai_common::types::AgentStatus::Busy;
        let agents = vec![busy];

        let selector = ScoredSelector;
        assert!(selector.select("coding", &agents).is_none());
    }

    #[test]
    fn ties_break_on_ascending_agent_id() {
        let a = agent("aaa", &["coding"]);
        let b = agent("bbb", &["coding"]);
        let agents = vec![b, a];

        let selector = ScoredSelector;
        let chosen = selector.select("coding", &agents).unwrap();
        assert_eq!(chosen.id, "aaa");
    }
}
