//! Loki push API client

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::{LogSink, SinkError};
use crate::config::LokiConfig;
use crate::telemetry::LogEvent;

/// Application identifier attached to every stream
pub const APP_NAME: &str = "telemetry-demo";

/// Namespace label attached to every stream
pub const NAMESPACE: &str = "development";

/// Body of a push request
#[derive(Debug, Serialize)]
pub struct PushRequest {
    pub streams: Vec<PushStream>,
}

/// One label set with its timestamped lines
#[derive(Debug, Serialize)]
pub struct PushStream {
    pub stream: BTreeMap<String, String>,
    /// `[timestamp_ns, line]` pairs; Loki wants the timestamp as a string
    pub values: Vec<[String; 2]>,
}

/// Client for `POST /loki/api/v1/push`
#[derive(Debug, Clone)]
pub struct LokiClient {
    client: reqwest::Client,
    push_url: String,
    environment: String,
}

impl LokiClient {
    /// Create a client whose requests are bounded by `config.timeout`
    pub fn new(config: &LokiConfig, environment: impl Into<String>) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(SinkError::Client)?;

        Ok(Self {
            client,
            push_url: config.push_url(),
            environment: environment.into(),
        })
    }

    pub fn push_url(&self) -> &str {
        &self.push_url
    }

    /// Build the push payload for a single event.
    ///
    /// Event labels are merged over the fixed app/namespace/environment/level
    /// set.
    pub fn payload(&self, event: &LogEvent) -> PushRequest {
        let mut stream = BTreeMap::new();
        stream.insert("app".to_string(), APP_NAME.to_string());
        stream.insert("namespace".to_string(), NAMESPACE.to_string());
        stream.insert("environment".to_string(), self.environment.clone());
        stream.insert("level".to_string(), event.severity().as_str().to_lowercase());
        stream.extend(event.labels().iter().map(|(k, v)| (k.clone(), v.clone())));

        PushRequest {
            streams: vec![PushStream {
                stream,
                values: vec![[event.timestamp_nanos().to_string(), event.message().to_string()]],
            }],
        }
    }
}

#[async_trait]
impl LogSink for LokiClient {
    async fn push(&self, event: &LogEvent) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.push_url)
            .json(&self.payload(event))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected { status, body });
        }

        debug!(url = %self.push_url, %status, "Pushed log line");
        Ok(())
    }
}
