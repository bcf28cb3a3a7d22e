//! Telemetry instruments
//!
//! The registry owns its own Prometheus recorder instead of installing a
//! global one, so the emitter and the exporter share it explicitly and
//! tests can inspect a fresh instance.

use anyhow::Result;
use metrics::{Key, KeyName, Label, Level, Metadata, Recorder, SharedString};
use metrics_exporter_prometheus::{
    ExporterFuture, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};
use std::net::SocketAddr;

use crate::telemetry::Severity;

/// Counter: generated log lines, by level and environment
pub const LOG_COUNTER: &str = "generated_logs_total";
/// Histogram: simulated request latency, by method and endpoint
pub const REQUEST_DURATION: &str = "http_request_duration_seconds";
/// Gauge: simulated active connections, by environment
pub const ACTIVE_CONNECTIONS: &str = "active_connections";

/// Histogram bucket bounds, in seconds
pub const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Label-dimensioned instruments for the emitter
pub struct TelemetryMetrics {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    environment: String,
}

impl TelemetryMetrics {
    /// Create a registry with no scrape listener attached
    pub fn new(environment: impl Into<String>) -> Result<Self> {
        let recorder = builder()?.build_recorder();
        Ok(Self::from_recorder(recorder, environment.into()))
    }

    /// Create a registry together with the exporter that serves it on `addr`.
    ///
    /// The listener is bound here; the returned future must be polled (see
    /// [`spawn_exporter`](super::spawn_exporter)) for scrapes to be answered.
    /// Must be called from within a Tokio runtime.
    pub fn with_exporter(
        environment: impl Into<String>,
        addr: SocketAddr,
    ) -> Result<(Self, ExporterFuture)> {
        let (recorder, exporter) = builder()?.with_http_listener(addr).build()?;
        Ok((Self::from_recorder(recorder, environment.into()), exporter))
    }

    fn from_recorder(recorder: PrometheusRecorder, environment: String) -> Self {
        let handle = recorder.handle();

        recorder.describe_counter(
            KeyName::from_const_str(LOG_COUNTER),
            None,
            SharedString::const_str("Total generated log lines"),
        );
        recorder.describe_histogram(
            KeyName::from_const_str(REQUEST_DURATION),
            None,
            SharedString::const_str("HTTP request duration in seconds"),
        );
        recorder.describe_gauge(
            KeyName::from_const_str(ACTIVE_CONNECTIONS),
            None,
            SharedString::const_str("Number of active connections"),
        );

        Self {
            recorder,
            handle,
            environment,
        }
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Count one generated log line
    pub fn record_log(&self, severity: Severity) {
        let key = Key::from_parts(
            LOG_COUNTER,
            vec![
                Label::new("level", severity.as_str()),
                Label::new("environment", self.environment.clone()),
            ],
        );
        self.recorder.register_counter(&key, &metadata()).increment(1);
    }

    /// Observe a request duration in seconds
    pub fn observe_request(&self, method: &'static str, endpoint: &str, seconds: f64) {
        let key = Key::from_parts(
            REQUEST_DURATION,
            vec![
                Label::new("method", method),
                Label::new("endpoint", endpoint.to_string()),
            ],
        );
        self.recorder.register_histogram(&key, &metadata()).record(seconds);
    }

    /// Overwrite the active connection gauge
    pub fn set_active_connections(&self, value: u64) {
        let key = Key::from_parts(
            ACTIVE_CONNECTIONS,
            vec![Label::new("environment", self.environment.clone())],
        );
        self.recorder.register_gauge(&key, &metadata()).set(value as f64);
    }

    /// Prometheus text exposition of the current state
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

fn builder() -> Result<PrometheusBuilder> {
    let builder = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), DURATION_BUCKETS)?;
    Ok(builder)
}

fn metadata() -> Metadata<'static> {
    Metadata::new(module_path!(), Level::INFO, Some(module_path!()))
}

/// Find the sample value of `name` whose labels include all of `labels`.
///
/// Works on the text exposition returned by [`TelemetryMetrics::render`].
#[cfg(test)]
pub(crate) fn sample_value(exposition: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
    exposition
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let (series, value) = line.rsplit_once(' ')?;
            let label_part = match series.strip_prefix(name)? {
                "" => "",
                rest => rest.strip_prefix('{')?.strip_suffix('}')?,
            };
            let matches = labels
                .iter()
                .all(|(k, v)| label_part.split(',').any(|p| p == format!("{k}=\"{v}\"")));
            if matches {
                value.parse().ok()
            } else {
                None
            }
        })
}
