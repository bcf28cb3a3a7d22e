//! Telemetry emitter loop
//!
//! One iteration draws an event, logs it locally, pushes it to the sink and
//! updates the instruments. Iterations are separated by a random pause that
//! is cut short by the shutdown signal.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::event::{synthesize, LogEvent, Severity, Synthesized};
use super::vocabulary::REQUEST_METHOD;
use crate::config::EmitterConfig;
use crate::metrics::TelemetryMetrics;
use crate::sink::LogSink;

/// Range of the simulated active connection gauge
pub const ACTIVE_CONNECTIONS_RANGE: RangeInclusive<u64> = 5..=50;

/// What a single iteration produced
#[derive(Debug, Clone)]
pub struct EmitReport {
    pub event: LogEvent,
    /// Duration fed to the histogram (info events only)
    pub request_duration: Option<f64>,
    /// Value the gauge was set to
    pub active_connections: u64,
    /// Whether the sink accepted the push
    pub delivered: bool,
}

/// Synthetic telemetry generator
pub struct Emitter {
    sink: Arc<dyn LogSink>,
    metrics: Arc<TelemetryMetrics>,
    config: EmitterConfig,
    rng: StdRng,
}

impl Emitter {
    /// Create an emitter seeded from the OS
    pub fn new(
        sink: Arc<dyn LogSink>,
        metrics: Arc<TelemetryMetrics>,
        config: EmitterConfig,
    ) -> Self {
        Self::with_rng(sink, metrics, config, StdRng::from_os_rng())
    }

    /// Create an emitter with a caller-supplied generator
    pub fn with_rng(
        sink: Arc<dyn LogSink>,
        metrics: Arc<TelemetryMetrics>,
        config: EmitterConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            sink,
            metrics,
            config,
            rng,
        }
    }

    /// Run one iteration: synthesize, log, push, record
    pub async fn tick(&mut self) -> EmitReport {
        let Synthesized {
            event,
            request_duration,
        } = synthesize(&mut self.rng);

        match event.severity() {
            Severity::Info => info!("{}", event.message()),
            Severity::Warning => warn!("{}", event.message()),
            Severity::Error => error!("{}", event.message()),
        }

        let delivered = match self.sink.push(&event).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, timeout = e.is_timeout(), "Failed to push to Loki");
                false
            }
        };

        self.metrics.record_log(event.severity());

        if let Some(seconds) = request_duration {
            if let Some(endpoint) = event.labels().get("endpoint") {
                self.metrics.observe_request(REQUEST_METHOD, endpoint, seconds);
            }
        }

        let active_connections = self.rng.random_range(ACTIVE_CONNECTIONS_RANGE);
        self.metrics.set_active_connections(active_connections);

        EmitReport {
            event,
            request_duration,
            active_connections,
            delivered,
        }
    }

    /// Draw the pause before the next iteration
    pub fn next_pause(&mut self) -> Duration {
        let min = self.config.min_interval.as_secs_f64();
        let max = self.config.max_interval.as_secs_f64();
        if max <= min {
            return self.config.min_interval;
        }
        Duration::from_secs_f64(self.rng.random_range(min..max))
    }

    /// Emit until the shutdown flag flips to `true`
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(
            environment = self.metrics.environment(),
            min_interval_secs = self.config.min_interval.as_secs_f64(),
            max_interval_secs = self.config.max_interval.as_secs_f64(),
            "Emitter started"
        );

        while !*shutdown_rx.borrow() {
            self.tick().await;

            let pause = self.next_pause();
            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Emitter stopped");
    }
}
