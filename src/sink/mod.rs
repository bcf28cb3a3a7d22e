//! Log sink
//!
//! Best-effort delivery of log events to an external aggregator. A push is
//! attempted once; failures come back as [`SinkError`] for the caller to log.

mod loki;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::telemetry::LogEvent;

pub use loki::{LokiClient, PushRequest, PushStream, APP_NAME, NAMESPACE};

/// Errors from a single push attempt
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("push request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("push rejected with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

impl SinkError {
    /// Whether the attempt ran into the request timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, SinkError::Request(e) if e.is_timeout())
    }
}

/// Destination for emitted log events
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Deliver one event, at most once
    async fn push(&self, event: &LogEvent) -> Result<(), SinkError>;
}
