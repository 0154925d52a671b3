//! Final uptime summary of a stopped monitor.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::outcome_log::FailedProbe;
use super::state::MonitorState;
use super::types::{MonitorId, StopCause};
use crate::error::MonitorError;

/// Percentage of successful probes.
///
/// Returns `None` when no probe ran (`total == 0`): uptime is undefined there,
/// and reports render it as `n/a` rather than guessing 0% or 100%.
pub fn uptime_percent(total: u64, failed: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    let successful = total.saturating_sub(failed) as f64;
    Some(successful / total as f64 * 100.0)
}

/// Summary produced once a monitor reaches `Stopped`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub id: MonitorId,
    /// `None` means no data: the monitor stopped before its first probe
    pub uptime_percent: Option<f64>,
    pub successful_requests: u64,
    pub total_requests: u64,
    pub failed_requests: Vec<FailedProbe>,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
    pub stop_cause: StopCause,
}

impl Report {
    /// Build the report of a stopped monitor
    pub fn from_state(state: &MonitorState) -> Result<Self, MonitorError> {
        match (state.is_stopped(), state.start_time, state.stop_time, state.stop_cause) {
            (true, Some(started_at), Some(stopped_at), Some(stop_cause)) => Ok(Self {
                id: state.id,
                uptime_percent: uptime_percent(
                    state.request_count,
                    state.failed_requests.len() as u64,
                ),
                successful_requests: state.successful_requests(),
                total_requests: state.request_count,
                failed_requests: state.failed_requests.as_slice().to_vec(),
                started_at,
                stopped_at,
                stop_cause,
            }),
            _ => Err(MonitorError::NotStopped(state.id)),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.uptime_percent {
            Some(percent) => writeln!(f, "uptime={percent:.2}%")?,
            None => writeln!(f, "uptime=n/a")?,
        }
        writeln!(f, "{} / {}", self.successful_requests, self.total_requests)?;
        writeln!(f, "errorcount: {}", self.failed_requests.len())?;
        for failed in &self.failed_requests {
            writeln!(
                f,
                "{}: {}",
                failed.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                failed.reason
            )?;
        }
        writeln!(f, "started: {}", self.started_at.to_rfc3339_opts(SecondsFormat::Secs, true))?;
        writeln!(f, "stopped: {}", self.stopped_at.to_rfc3339_opts(SecondsFormat::Secs, true))?;
        write!(f, "reason: {}", self.stop_cause)
    }
}
