//! Loki client against a mock push endpoint

use std::time::Duration;

use serde_json::Value;
use tokio_test::{assert_err, assert_ok};

use telemetry_demo::config::LokiConfig;
use telemetry_demo::sink::{LogSink, LokiClient, SinkError, APP_NAME, NAMESPACE};
use telemetry_demo::telemetry::{Labels, LogEvent, Severity};

use crate::support::{MockBehavior, MockLoki};

fn client_for(mock: &MockLoki, timeout: Duration) -> LokiClient {
    let config = LokiConfig {
        url: mock.base_url(),
        timeout,
    };
    assert_ok!(LokiClient::new(&config, "staging"))
}

#[tokio::test]
async fn test_push_wire_format() {
    let mut mock = MockLoki::start(MockBehavior::Status(204)).await;
    let client = client_for(&mock, Duration::from_secs(3));

    let mut labels = Labels::new();
    labels.insert("user".to_string(), "diana".to_string());
    labels.insert("endpoint".to_string(), "/api/login".to_string());
    let event = LogEvent::new(Severity::Info, "User 'diana' fetched resource", labels);

    assert_ok!(client.push(&event).await);

    let request = mock.requests.recv().await.unwrap();
    assert_eq!(request.request_line, "POST /loki/api/v1/push HTTP/1.1");
    assert_eq!(request.header("content-type"), Some("application/json"));

    let body: Value = serde_json::from_slice(&request.body).unwrap();
    let stream = &body["streams"][0];
    assert_eq!(stream["stream"]["app"], APP_NAME);
    assert_eq!(stream["stream"]["namespace"], NAMESPACE);
    assert_eq!(stream["stream"]["environment"], "staging");
    assert_eq!(stream["stream"]["level"], "info");
    assert_eq!(stream["stream"]["user"], "diana");
    assert_eq!(stream["stream"]["endpoint"], "/api/login");

    let value = &stream["values"][0];
    assert_eq!(value[0], event.timestamp_nanos().to_string());
    assert_eq!(value[1], "User 'diana' fetched resource");
}

#[tokio::test]
async fn test_error_status_is_rejected() {
    let mock = MockLoki::start(MockBehavior::Status(500)).await;
    let client = client_for(&mock, Duration::from_secs(3));

    let result = client
        .push(&LogEvent::new(Severity::Error, "boom", Labels::new()))
        .await;
    match assert_err!(result) {
        SinkError::Rejected { status, .. } => assert_eq!(status.as_u16(), 500),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_any_success_status_is_accepted() {
    for status in [200, 204] {
        let mut mock = MockLoki::start(MockBehavior::Status(status)).await;
        let client = client_for(&mock, Duration::from_secs(3));

        assert_ok!(
            client
                .push(&LogEvent::new(Severity::Info, "ok", Labels::new()))
                .await
        );
        assert!(mock.requests.recv().await.is_some());
    }
}

#[tokio::test]
async fn test_slow_sink_times_out() {
    let mock = MockLoki::start(MockBehavior::Hang).await;
    let client = client_for(&mock, Duration::from_millis(200));

    let started = std::time::Instant::now();
    let result = client
        .push(&LogEvent::new(Severity::Warning, "slow", Labels::new()))
        .await;

    let err = assert_err!(result);
    assert!(err.is_timeout(), "{err}");
    assert!(started.elapsed() < Duration::from_secs(2));
}
