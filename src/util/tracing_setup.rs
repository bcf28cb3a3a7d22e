//! Tracing/logging initialization
//!
//! Generated events are written through the same subscriber as the
//! process's own diagnostics, so the level filter also decides which
//! synthetic lines reach stdout.

use anyhow::{anyhow, Result};
use std::str::FromStr;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Directives appended to the configured level so that the HTTP client
/// used for pushes does not flood debug output.
const QUIET_DEPENDENCIES: &[&str] = &["hyper=warn", "hyper_util=warn", "reqwest=warn", "h2=warn"];

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, one line per event
    #[default]
    Pretty,
    /// One JSON object per event, for log shippers
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" | "" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow!("unknown log format '{other}'")),
        }
    }
}

/// Map a conventional level name (`LOG_LEVEL`) onto a tracing directive.
///
/// Unknown names fall back to `info`.
pub fn level_directive(raw: &str) -> &'static str {
    match raw.trim().to_ascii_uppercase().as_str() {
        "TRACE" => "trace",
        "DEBUG" => "debug",
        "WARNING" | "WARN" => "warn",
        "ERROR" | "CRITICAL" | "FATAL" => "error",
        _ => "info",
    }
}

/// Filter directives for a configured level, `RUST_LOG` taking precedence
fn filter_directives(level: &str, rust_log: Option<&str>) -> String {
    match rust_log.map(str::trim).filter(|s| !s.is_empty()) {
        Some(explicit) => explicit.to_string(),
        None => std::iter::once(level)
            .chain(QUIET_DEPENDENCIES.iter().copied())
            .collect::<Vec<_>>()
            .join(","),
    }
}

/// Initialize the tracing subscriber based on configuration.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = EnvFilter::try_new(filter_directives(&config.level, rust_log.as_deref()))
        .or_else(|_| EnvFilter::try_new(filter_directives(&config.level, None)))?;

    let subscriber = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .flatten_event(true)
                .with_target(true)
                .with_current_span(false);
            subscriber.with(fmt_layer).try_init()?;
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer().with_target(false);
            subscriber.with(fmt_layer).try_init()?;
        }
    }

    Ok(())
}
