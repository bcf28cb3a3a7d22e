//! Telemetry Demo - Entry Point
//!
//! Runs the emitter loop with the metrics exporter and health listener.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

use telemetry_demo::metrics::{spawn_exporter, TelemetryMetrics, METRICS_PATH};
use telemetry_demo::server::spawn_health_server;
use telemetry_demo::sink::LokiClient;
use telemetry_demo::{Config, Emitter, VERSION};

/// Application entry point
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;

    telemetry_demo::util::init_tracing(&config.logging)?;

    info!(
        version = VERSION,
        environment = %config.environment,
        loki_url = %config.loki.url,
        "Starting Telemetry Demo"
    );

    let metrics_addr = config.metrics.bind_addr;
    let (metrics, exporter) =
        TelemetryMetrics::with_exporter(config.environment.clone(), metrics_addr)
            .with_context(|| format!("Failed to start metrics endpoint on {metrics_addr}"))?;
    let metrics = Arc::new(metrics);
    let sink = Arc::new(
        LokiClient::new(&config.loki, config.environment.clone())
            .context("Failed to build Loki client")?,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let exporter_task = spawn_exporter(exporter, shutdown_rx.clone());
    info!(
        addr = %metrics_addr,
        path = METRICS_PATH,
        "Prometheus metrics endpoint started"
    );

    // Liveness is best effort: without it the emitter still runs
    let health = spawn_health_server(config.health.bind_addr, shutdown_rx.clone()).await;

    info!(url = %sink.push_url(), "Pushing logs to Loki");

    let emitter = Emitter::new(sink, metrics, config.emitter.clone());
    let emitter_task = tokio::spawn(emitter.run(shutdown_rx));

    shutdown_signal().await;
    info!("Shutdown signal received, stopping tasks...");
    let _ = shutdown_tx.send(true);

    let _ = tokio::join!(emitter_task, exporter_task);
    if let Some(health) = health {
        let _ = health.task.await;
    }

    info!("Telemetry Demo stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
