//! Metrics and observability
//!
//! Prometheus instruments for the emitter and the scrape endpoint that
//! exposes them.

mod exporter;
mod registry;

pub use exporter::{spawn_exporter, METRICS_PATH};
pub use registry::{
    TelemetryMetrics, ACTIVE_CONNECTIONS, DURATION_BUCKETS, LOG_COUNTER, REQUEST_DURATION,
};

#[cfg(test)]
pub(crate) use registry::sample_value;
