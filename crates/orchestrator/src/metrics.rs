//! Per-provider running metrics, mirrored into the Prometheus collector.

use dashmap::DashMap;
use meta_ai_common::metrics::MetricsCollector;
use meta_ai_common::types::{ProviderMetrics, ProviderTag};
use std::sync::Arc;

/// Aggregates [`ProviderMetrics`] per provider family. Every adapter
/// invocation — including retries — is one record, matching the
/// provider-level running mean's definition of `total_tasks`.
pub struct MetricsAggregator {
    per_provider: DashMap<ProviderTag, ProviderMetrics>,
    collector: Arc<dyn MetricsCollector>,
}

impl MetricsAggregator {
    pub fn new(collector: Arc<dyn MetricsCollector>) -> Self {
        Self {
            per_provider: DashMap::new(),
            collector,
        }
    }

    pub fn record(&self, provider: ProviderTag, task_type: &str, success: bool, elapsed_secs: f64) {
        self.per_provider
            .entry(provider)
            .or_default()
            .record(success, elapsed_secs);

        let status = if success { "success" } else { "failure" };
        self.collector
            .record_request(provider.as_str(), task_type, status, elapsed_secs);
    }

    pub fn snapshot(&self, provider: ProviderTag) -> ProviderMetrics {
        self.per_provider.get(&provider).map(|m| m.clone()).unwrap_or_default()
    }

    pub fn snapshot_all(&self) -> Vec<(ProviderTag, ProviderMetrics)> {
        self.per_provider
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    /// The Prometheus-backed collector this aggregator mirrors into,
    /// used by the worker pool to set gauges (active tasks, queue size)
    /// that aren't part of the per-provider running counters above.
    pub fn collector(&self) -> &Arc<dyn MetricsCollector> {
        &self.collector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meta_ai_common::metrics::DefaultMetricsCollector;

    #[test]
    fn average_time_is_total_time_over_total_tasks() {
        let aggregator = MetricsAggregator::new(Arc::new(DefaultMetricsCollector));
        aggregator.record(ProviderTag::Gpt, "coding", true, 2.0);
        aggregator.record(ProviderTag::Gpt, "coding", false, 4.0);

        let snapshot = aggregator.snapshot(ProviderTag::Gpt);
        assert_eq!(snapshot.total_tasks, 2);
        assert_eq!(snapshot.successful_tasks, 1);
        assert_eq!(snapshot.failed_tasks, 1);
        assert!((snapshot.average_time - 3.0).abs() < f64::EPSILON);
    }
}
