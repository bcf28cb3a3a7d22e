//! HTTP listeners
//!
//! Passive responder for the liveness check.

mod health;
pub mod http;

pub use health::{health_route, spawn_health_server, start_health_server, HEALTH_PATH};
pub use http::{ListenerHandle, Request, Response};
