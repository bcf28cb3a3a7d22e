//! Health listener and metrics exporter over TCP

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;

use telemetry_demo::metrics::{spawn_exporter, TelemetryMetrics, LOG_COUNTER};
use telemetry_demo::server::{spawn_health_server, start_health_server};
use telemetry_demo::telemetry::Severity;

use crate::support::{free_local_addr, raw_request, sample_value};

fn any_port() -> SocketAddr {
    "127.0.0.1:0".parse().unwrap()
}

#[tokio::test]
async fn test_healthz_returns_ok() {
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let health = start_health_server(any_port(), shutdown_rx).await.unwrap();

    let response = raw_request(
        health.local_addr,
        "GET /healthz HTTP/1.1\r\nHost: localhost\r\n\r\n",
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert!(response.contains("Content-Type: text/plain\r\n"));
    assert!(response.ends_with("\r\n\r\nOK"));
}

#[tokio::test]
async fn test_healthz_split_across_writes() {
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let health = start_health_server(any_port(), shutdown_rx).await.unwrap();

    for (first, second) in [
        ("GET /hea", "lthz HTTP/1.1\r\nHost: localhost\r\n\r\n"),
        ("GET", " /healthz HTTP/1.1\r\nHost: localhost\r\n\r\n"),
    ] {
        let mut stream = TcpStream::connect(health.local_addr).await.unwrap();
        stream.write_all(first.as_bytes()).await.unwrap();
        stream.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        stream.write_all(second.as_bytes()).await.unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        let response = String::from_utf8(response).unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{first:?}: {response}");
    }
}

#[tokio::test]
async fn test_unknown_path_returns_not_found() {
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let health = start_health_server(any_port(), shutdown_rx).await.unwrap();

    for path in ["/", "/anything-else", "/metrics"] {
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n");
        let response = raw_request(health.local_addr, &request).await;
        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"), "{path}: {response}");
    }
}

#[tokio::test]
async fn test_health_listener_stops_on_shutdown() {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let health = start_health_server(any_port(), shutdown_rx).await.unwrap();

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), health.task)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_bind_conflict_is_reported() {
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let first = start_health_server(any_port(), shutdown_rx.clone()).await.unwrap();

    let second = start_health_server(first.local_addr, shutdown_rx).await;
    assert!(second.is_err());
}

#[tokio::test]
async fn test_health_bind_failure_is_not_fatal() {
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let first = start_health_server(any_port(), shutdown_rx.clone()).await.unwrap();

    // Port taken: no listener, no error for the caller
    let second = spawn_health_server(first.local_addr, shutdown_rx).await;
    assert!(second.is_none());

    // The original listener keeps answering
    let response = raw_request(
        first.local_addr,
        "GET /healthz HTTP/1.1\r\nHost: localhost\r\n\r\n",
    )
    .await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
}

#[tokio::test]
async fn test_metrics_scrape() {
    let addr = free_local_addr();
    let (metrics, exporter) = TelemetryMetrics::with_exporter("dev", addr).unwrap();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = spawn_exporter(exporter, shutdown_rx);

    metrics.record_log(Severity::Info);
    metrics.observe_request("GET", "/api/orders", 0.42);
    metrics.set_active_connections(17);

    let scrape = "GET /metrics HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n";
    let response = raw_request(addr, scrape).await;

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert!(response.contains("http_request_duration_seconds_bucket"));
    assert!(response.contains("active_connections"));
    assert_eq!(
        sample_value(&response, LOG_COUNTER, &[("level", "info"), ("environment", "dev")]),
        Some(1.0)
    );

    // Later updates are visible on the next scrape
    metrics.record_log(Severity::Error);
    let response = raw_request(addr, scrape).await;
    assert_eq!(
        sample_value(&response, LOG_COUNTER, &[("level", "error")]),
        Some(1.0)
    );

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_metrics_port_conflict_is_an_error() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = taken.local_addr().unwrap();

    assert!(TelemetryMetrics::with_exporter("dev", addr).is_err());
}
