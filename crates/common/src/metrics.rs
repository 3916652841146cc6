//! Prometheus metrics registration and the in-process collector facade

use crate::error::Result;
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge_vec, register_histogram_vec, CounterVec, GaugeVec,
    HistogramVec, Registry,
};

/// Global metrics registry, scraped separately from `/metrics`.
pub static METRICS_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// Total task executions attempted, by provider/status/task_type.
pub static REQUEST_COUNTER: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "meta_ai_requests_total",
        "Total number of task executions attempted",
        &["provider", "status", "task_type"]
    )
    .unwrap()
});

/// Task execution duration, by provider/task_type.
pub static REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "meta_ai_request_duration_seconds",
        "Task execution duration in seconds",
        &["provider", "task_type"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0]
    )
    .unwrap()
});

/// Active in-flight task gauge, by provider/priority.
pub static ACTIVE_TASKS: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "meta_ai_active_tasks",
        "Number of tasks currently in progress",
        &["provider", "priority"]
    )
    .unwrap()
});

/// Current priority queue depth.
pub static QUEUE_SIZE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "meta_ai_queue_size",
        "Number of tasks currently queued",
        &["priority"]
    )
    .unwrap()
});

/// Errors observed, by error type/severity/provider.
pub static ERROR_COUNTER: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "meta_ai_errors_total",
        "Total number of errors",
        &["error_type", "severity", "provider"]
    )
    .unwrap()
});

/// Register every metric with the global registry. Idempotent at process
/// start; call once during telemetry init.
pub fn init_metrics() -> Result<()> {
    METRICS_REGISTRY.register(Box::new(REQUEST_COUNTER.clone()))?;
    METRICS_REGISTRY.register(Box::new(REQUEST_DURATION.clone()))?;
    METRICS_REGISTRY.register(Box::new(ACTIVE_TASKS.clone()))?;
    METRICS_REGISTRY.register(Box::new(QUEUE_SIZE.clone()))?;
    METRICS_REGISTRY.register(Box::new(ERROR_COUNTER.clone()))?;

    Ok(())
}

/// Facade the orchestrator engine records against, kept separate from the
/// Prometheus statics so the engine's own in-memory `ProviderMetrics`
/// aggregator (queryable via `/metrics`) doesn't need to know about
/// Prometheus labels.
pub trait MetricsCollector: Send + Sync {
    fn record_request(&self, provider: &str, task_type: &str, status: &str, duration_secs: f64);
    fn record_error(&self, error_type: &str, severity: &str, provider: &str);
    fn set_active_tasks(&self, provider: &str, priority: &str, count: f64);
    fn set_queue_size(&self, priority: &str, count: f64);
}

/// Default collector backed by the global Prometheus registry.
#[derive(Clone, Default)]
pub struct DefaultMetricsCollector;

impl MetricsCollector for DefaultMetricsCollector {
    fn record_request(&self, provider: &str, task_type: &str, status: &str, duration_secs: f64) {
        REQUEST_COUNTER
            .with_label_values(&[provider, status, task_type])
            .inc();

        REQUEST_DURATION
            .with_label_values(&[provider, task_type])
            .observe(duration_secs);
    }

    fn record_error(&self, error_type: &str, severity: &str, provider: &str) {
        ERROR_COUNTER
            .with_label_values(&[error_type, severity, provider])
            .inc();
    }

    fn set_active_tasks(&self, provider: &str, priority: &str, count: f64) {
        ACTIVE_TASKS.with_label_values(&[provider, priority]).set(count);
    }

    fn set_queue_size(&self, priority: &str, count: f64) {
        QUEUE_SIZE.with_label_values(&[priority]).set(count);
    }
}
