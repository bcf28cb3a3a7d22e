//! Emitter iterations against a real Loki client

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use telemetry_demo::config::{EmitterConfig, LokiConfig};
use telemetry_demo::metrics::{TelemetryMetrics, LOG_COUNTER};
use telemetry_demo::sink::LokiClient;
use telemetry_demo::telemetry::{Emitter, Severity};

use crate::support::{sample_value, MockBehavior, MockLoki};

fn total_logs(metrics: &TelemetryMetrics) -> f64 {
    let text = metrics.render();
    Severity::ALL
        .iter()
        .filter_map(|s| sample_value(&text, LOG_COUNTER, &[("level", s.as_str())]))
        .sum()
}

fn emitter_for(url: String, timeout: Duration, seed: u64) -> (Emitter, Arc<TelemetryMetrics>) {
    let metrics = Arc::new(TelemetryMetrics::new("dev").unwrap());
    let sink = Arc::new(LokiClient::new(&LokiConfig { url, timeout }, "dev").unwrap());
    let emitter = Emitter::with_rng(
        sink,
        metrics.clone(),
        EmitterConfig::default(),
        StdRng::seed_from_u64(seed),
    );
    (emitter, metrics)
}

#[tokio::test]
async fn test_iterations_reach_sink() {
    let mut mock = MockLoki::start(MockBehavior::Status(204)).await;
    let (mut emitter, metrics) = emitter_for(mock.base_url(), Duration::from_secs(3), 8);

    for expected in 1..=5 {
        let report = emitter.tick().await;
        assert!(report.delivered);

        let request = mock.requests.recv().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body["streams"][0]["values"][0][1], report.event.message());
        assert_eq!(total_logs(&metrics), expected as f64);
    }
}

#[tokio::test]
async fn test_hanging_sink_does_not_stall_iterations() {
    let mock = MockLoki::start(MockBehavior::Hang).await;
    let (mut emitter, metrics) = emitter_for(mock.base_url(), Duration::from_millis(200), 3);

    for expected in 1..=2 {
        let started = Instant::now();
        let report = emitter.tick().await;

        assert!(!report.delivered);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(total_logs(&metrics), expected as f64);
    }
}

#[tokio::test]
async fn test_unreachable_sink_does_not_raise() {
    let (mut emitter, metrics) =
        emitter_for("http://127.0.0.1:1".to_string(), Duration::from_millis(500), 4);

    let report = emitter.tick().await;
    assert!(!report.delivered);
    assert_eq!(total_logs(&metrics), 1.0);
}
