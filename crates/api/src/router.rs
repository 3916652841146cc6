//! Route table: the endpoint set documented in spec §6, bound to
//! [`AppState`] and wrapped with permissive CORS and request tracing.

use crate::handlers;
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/agents", get(handlers::list_agents))
        .route("/agents/register", post(handlers::register_agent))
        .route("/agents/:agent_id", axum::routing::delete(handlers::unregister_agent))
        .route("/tasks/submit", post(handlers::submit_task))
        .route("/tasks/:task_id", get(handlers::get_task))
        .route("/tasks", get(handlers::list_tasks_aggregate))
        .route("/status", get(handlers::status))
        .route("/metrics", get(handlers::metrics))
        .route("/test", post(handlers::test))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use meta_ai_common::config::OrchestratorConfig;
    use meta_ai_common::metrics::DefaultMetricsCollector;
    use meta_ai_orchestrator_engine::MetaAIOrchestrator;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let orchestrator = Arc::new(MetaAIOrchestrator::new(
            OrchestratorConfig {
                worker_count: 1,
                task_queue_capacity: 100,
                default_max_retries: 1,
                queue_pull_timeout_ms: 10,
                execute_timeout_ms: 1000,
                health_check_timeout_ms: 1000,
                dependency_watch_interval_ms: 1000,
                selector_backoff_ms: 10,
            },
            Arc::new(DefaultMetricsCollector),
        ));
        AppState { orchestrator }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_not_running_before_start() {
        let app = router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["orchestrator"]["running"], json!(false));
    }

    #[tokio::test]
    async fn submit_task_without_dependencies_returns_submitted_id() {
        let app = router(test_state());
        let payload = json!({
            "task_type": "code_generation",
            "prompt": "write a test",
            "priority": "high",
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/tasks/submit")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["status"], json!("submitted"));
        assert!(body["task_id"].is_string());
    }

    #[tokio::test]
    async fn submit_task_missing_prompt_is_rejected() {
        let app = router(test_state());
        let payload = json!({ "task_type": "code_generation", "prompt": "" });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/tasks/submit")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_unknown_task_returns_404() {
        let app = router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/tasks/{}", uuid::Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn status_is_unavailable_before_start() {
        let app = router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
