//! Liveness check listener

use std::io;
use std::net::SocketAddr;

use tokio::sync::watch;
use tracing::error;

use super::http::{self, ListenerHandle, Request, Response};

/// Liveness path
pub const HEALTH_PATH: &str = "/healthz";

/// Route a request to the liveness response
pub fn health_route(request: &Request) -> Response {
    if request.method != "GET" {
        return Response::method_not_allowed();
    }
    match request.path.as_str() {
        HEALTH_PATH => Response::ok("text/plain", "OK"),
        _ => Response::not_found(),
    }
}

/// Start the health check listener
pub async fn start_health_server(
    addr: SocketAddr,
    shutdown_rx: watch::Receiver<bool>,
) -> io::Result<ListenerHandle> {
    http::serve("health", addr, health_route, shutdown_rx).await
}

/// Start the health check listener without ever failing the caller.
///
/// A bind error is logged and `None` is returned; the rest of the process
/// keeps running without a liveness endpoint.
pub async fn spawn_health_server(
    addr: SocketAddr,
    shutdown_rx: watch::Receiver<bool>,
) -> Option<ListenerHandle> {
    match start_health_server(addr, shutdown_rx).await {
        Ok(handle) => Some(handle),
        Err(e) => {
            error!(%addr, error = %e, "Health check server failed to start");
            None
        }
    }
}
