//! Telemetry Demo - synthetic observability workload
//!
//! Generates plausible application log lines, pushes them to Loki, and
//! exposes matching Prometheus instruments alongside a liveness probe.

pub mod config;
pub mod emoji;
pub mod metrics;
pub mod server;
pub mod sink;
pub mod telemetry;
pub mod util;

pub use config::Config;
pub use telemetry::Emitter;

/// Crate version for display
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
