//! Log events and their synthesis
//!
//! Each severity class has its own message template and label schema:
//! info carries `user` and `endpoint`, warning carries `user`, error
//! carries `endpoint`.

use once_cell::sync::Lazy;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::time::{SystemTime, UNIX_EPOCH};

use super::vocabulary::{ACTIONS, ENDPOINTS, ERRORS, USERS};

/// Label set attached to an event
pub type Labels = BTreeMap<String, String>;

/// Duration range for info-class requests, in seconds
pub const REQUEST_DURATION_SECS: Range<f64> = 0.01..2.0;

/// Duration range for slow-query warnings, in seconds
pub const SLOW_QUERY_SECS: Range<f64> = 2.0..5.0;

static SEVERITY_WEIGHTS: Lazy<WeightedIndex<u32>> = Lazy::new(|| {
    WeightedIndex::new(Severity::ALL.map(Severity::weight)).expect("non-zero severity weights")
});

/// Severity class of a synthetic event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Info, Severity::Warning, Severity::Error];

    /// Relative draw weight (out of 100)
    pub const fn weight(self) -> u32 {
        match self {
            Severity::Info => 70,
            Severity::Warning => 20,
            Severity::Error => 10,
        }
    }

    /// Lowercase label value
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    /// Draw a severity from the weighted distribution
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[SEVERITY_WEIGHTS.sample(rng)]
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single synthetic log line
#[derive(Debug, Clone)]
pub struct LogEvent {
    severity: Severity,
    message: String,
    labels: Labels,
    timestamp: SystemTime,
}

impl LogEvent {
    /// Create an event stamped with the current time
    pub fn new(severity: Severity, message: impl Into<String>, labels: Labels) -> Self {
        Self {
            severity,
            message: message.into(),
            labels,
            timestamp: SystemTime::now(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Severity-specific labels (not including sink defaults)
    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Nanoseconds since the Unix epoch
    pub fn timestamp_nanos(&self) -> u128 {
        self.timestamp
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default()
    }
}

/// Result of synthesizing one event
#[derive(Debug, Clone)]
pub struct Synthesized {
    pub event: LogEvent,
    /// Request duration in seconds, present for info events only
    pub request_duration: Option<f64>,
}

/// Draw a severity and build a matching event
pub fn synthesize<R: Rng + ?Sized>(rng: &mut R) -> Synthesized {
    let severity = Severity::draw(rng);
    synthesize_with(severity, rng)
}

/// Build an event of the given severity
pub fn synthesize_with<R: Rng + ?Sized>(severity: Severity, rng: &mut R) -> Synthesized {
    match severity {
        Severity::Info => {
            let user = pick(rng, USERS);
            let endpoint = pick(rng, ENDPOINTS);
            let action = pick(rng, ACTIONS);
            let duration = rng.random_range(REQUEST_DURATION_SECS);

            let message = format!(
                "User '{user}' {action} resource at {endpoint} (duration: {duration:.3}s)"
            );
            Synthesized {
                event: LogEvent::new(
                    severity,
                    message,
                    labels(&[("user", user), ("endpoint", endpoint)]),
                ),
                request_duration: Some(duration),
            }
        }
        Severity::Warning => {
            let user = pick(rng, USERS);
            let took = rng.random_range(SLOW_QUERY_SECS);

            let message = format!("Slow query detected for user '{user}' - took {took:.2}s");
            Synthesized {
                event: LogEvent::new(severity, message, labels(&[("user", user)])),
                request_duration: None,
            }
        }
        Severity::Error => {
            let error = pick(rng, ERRORS);
            let endpoint = pick(rng, ENDPOINTS);

            let message = format!("Error at {endpoint}: {error}");
            Synthesized {
                event: LogEvent::new(severity, message, labels(&[("endpoint", endpoint)])),
                request_duration: None,
            }
        }
    }
}

#[inline]
fn pick<R: Rng + ?Sized>(rng: &mut R, pool: &'static [&'static str]) -> &'static str {
    pool[rng.random_range(0..pool.len())]
}

fn labels(pairs: &[(&str, &str)]) -> Labels {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
