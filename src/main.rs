//! Meta-AI Orchestrator main entry point: loads configuration, wires the
//! orchestrator engine to its Control API, auto-bootstraps the default
//! agent table, and serves HTTP until interrupted.

use anyhow::{Context, Result};
use meta_ai_api::AppState;
use meta_ai_common::metrics::{init_metrics, DefaultMetricsCollector};
use meta_ai_common::{telemetry, Config};
use meta_ai_orchestrator_engine::{bootstrap, MetaAIOrchestrator};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Config error: {error}");
        }
        std::process::exit(1);
    }

    telemetry::init_telemetry(&config.observability)?;
    if config.observability.metrics_enabled {
        init_metrics().context("failed to register Prometheus metrics")?;
    }

    info!("Starting Meta-AI Orchestrator v{}", env!("CARGO_PKG_VERSION"));

    let orchestrator = Arc::new(MetaAIOrchestrator::new(
        config.orchestrator.clone(),
        Arc::new(DefaultMetricsCollector),
    ));

    bootstrap::auto_bootstrap(&orchestrator, &config).await;
    let running = orchestrator.start();

    let app = meta_ai_api::router::router(AppState {
        orchestrator: Arc::clone(&orchestrator),
    });

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    info!("Control API listening on http://{}", bind_addr);

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        info!("shutdown signal received, draining workers");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("server error")?;

    orchestrator.shutdown();
    for worker in running.workers {
        worker.abort();
    }
    running.watcher.abort();

    telemetry::shutdown_telemetry();
    info!("Meta-AI Orchestrator stopped");

    Ok(())
}
