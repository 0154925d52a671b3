use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a monitor, assigned once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitorId(Uuid);

impl MonitorId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MonitorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MonitorId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Lifecycle phase of a monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Stopped,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Running => write!(f, "running"),
            Phase::Stopped => write!(f, "stopped"),
        }
    }
}

/// Why a monitor entered [`Phase::Stopped`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopCause {
    /// A caller asked the monitor to stop
    Requested,
    /// The configured monitoring timeout elapsed
    TimedOut,
    /// A probe failed, which ends monitoring
    ProbeFailed,
}

impl fmt::Display for StopCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopCause::Requested => write!(f, "stop requested"),
            StopCause::TimedOut => write!(f, "timed out"),
            StopCause::ProbeFailed => write!(f, "probe failed"),
        }
    }
}

/// Why a single probe was classified as failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProbeFailure {
    /// The endpoint answered with a non-2xx status
    Http { status_code: u16, body_snippet: String },
    /// No usable response: DNS, connect, read errors or a timeout
    Transport { reason: String },
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeFailure::Http { status_code, body_snippet } => {
                write!(f, "http status code: {status_code}, response body: {body_snippet}")
            }
            ProbeFailure::Transport { reason } => {
                write!(f, "error performing http request: {reason}")
            }
        }
    }
}

/// Classified result of one probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(ProbeFailure),
}

impl Outcome {
    pub fn http_failure(status_code: u16, body_snippet: impl Into<String>) -> Self {
        Outcome::Failure(ProbeFailure::Http { status_code, body_snippet: body_snippet.into() })
    }

    pub fn transport_failure(reason: impl Into<String>) -> Self {
        Outcome::Failure(ProbeFailure::Transport { reason: reason.into() })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}
