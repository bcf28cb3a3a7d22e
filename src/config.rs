//! Configuration management
//!
//! Reads the process-wide configuration from environment variables once at
//! startup. Every setting has a default, so an empty environment is valid.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

use crate::util::{level_directive, LogFormat};

/// Default Loki endpoint inside the demo cluster
pub const DEFAULT_LOKI_URL: &str = "http://loki.monitoring.svc.cluster.local:3100";

/// Health listener port (not configurable)
pub const HEALTH_PORT: u16 = 8080;

/// Root configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment tag attached to logs and metrics
    pub environment: String,
    pub loki: LokiConfig,
    pub metrics: MetricsConfig,
    pub health: HealthConfig,
    pub emitter: EmitterConfig,
    pub logging: LoggingConfig,
}

/// Log sink configuration
#[derive(Debug, Clone)]
pub struct LokiConfig {
    /// Base URL, without the push path
    pub url: String,
    /// Bound on a single push request
    pub timeout: Duration,
}

impl LokiConfig {
    /// Full URL of the push API
    pub fn push_url(&self) -> String {
        format!("{}/loki/api/v1/push", self.url.trim_end_matches('/'))
    }
}

impl Default for LokiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_LOKI_URL.to_string(),
            timeout: Duration::from_secs(3),
        }
    }
}

/// Metrics exporter configuration
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Exporter bind address
    pub bind_addr: SocketAddr,
}

/// Health listener configuration
#[derive(Debug, Clone)]
pub struct HealthConfig {
    pub bind_addr: SocketAddr,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], HEALTH_PORT)),
        }
    }
}

/// Emitter loop pacing
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// Shortest pause between iterations
    pub min_interval: Duration,
    /// Longest pause between iterations (exclusive)
    pub max_interval: Duration,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_secs(5),
            max_interval: Duration::from_secs(10),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive ("debug", "info", "warn", ...)
    pub level: String,
    /// Console output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let metrics_port: u16 = var("METRICS_PORT", "8000")
            .trim()
            .parse()
            .with_context(|| "Failed to parse METRICS_PORT")?;

        Ok(Self {
            environment: var("ENVIRONMENT", "dev"),
            loki: LokiConfig {
                url: var("LOKI_URL", DEFAULT_LOKI_URL),
                ..LokiConfig::default()
            },
            metrics: MetricsConfig {
                bind_addr: SocketAddr::from(([0, 0, 0, 0], metrics_port)),
            },
            health: HealthConfig::default(),
            emitter: EmitterConfig::default(),
            logging: LoggingConfig {
                level: level_directive(&var("LOG_LEVEL", "INFO")).to_string(),
                format: var("LOG_FORMAT", "pretty").parse().unwrap_or_default(),
            },
        })
    }
}
