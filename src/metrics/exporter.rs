//! Prometheus metrics exporter
//!
//! Drives the HTTP listener built by `metrics-exporter-prometheus` until
//! shutdown.

use metrics_exporter_prometheus::ExporterFuture;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Conventional scrape path
pub const METRICS_PATH: &str = "/metrics";

/// Spawn the exporter future, stopping it when the shutdown flag flips
pub fn spawn_exporter(
    exporter: ExporterFuture,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = exporter => {
                // ExporterError (metrics-exporter-prometheus 0.15) implements
                // neither Debug nor Display, so the error value cannot be logged.
                if result.is_err() {
                    error!("Metrics exporter stopped with error");
                }
            }
            _ = async {
                while shutdown_rx.changed().await.is_ok() {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            } => {}
        }
        info!("Metrics exporter stopped");
    })
}
