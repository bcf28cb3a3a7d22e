//! Synthetic telemetry
//!
//! Label vocabulary, event synthesis and the emitter loop.

mod emitter;
mod event;
mod vocabulary;

pub use emitter::{EmitReport, Emitter, ACTIVE_CONNECTIONS_RANGE};
pub use event::{
    synthesize, synthesize_with, Labels, LogEvent, Severity, Synthesized, REQUEST_DURATION_SECS,
    SLOW_QUERY_SECS,
};
pub use vocabulary::{ACTIONS, ENDPOINTS, ERRORS, REQUEST_METHOD, USERS};
