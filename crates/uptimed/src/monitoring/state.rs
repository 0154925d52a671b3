use chrono::{DateTime, Utc};
use serde::Serialize;

use super::outcome_log::OutcomeLog;
use super::types::{MonitorId, Phase, ProbeFailure, StopCause};

/// Mutable monitor state, written only by the monitor's own worker.
///
/// Outside readers get clones through `Monitor::snapshot`, so counters and the
/// failure log are always observed together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorState {
    pub id: MonitorId,
    pub phase: Phase,
    pub request_count: u64,
    pub failed_requests: OutcomeLog,
    pub start_time: Option<DateTime<Utc>>,
    pub stop_time: Option<DateTime<Utc>>,
    pub stop_cause: Option<StopCause>,
}

impl MonitorState {
    pub(crate) fn new(id: MonitorId) -> Self {
        Self {
            id,
            phase: Phase::Idle,
            request_count: 0,
            failed_requests: OutcomeLog::new(),
            start_time: None,
            stop_time: None,
            stop_cause: None,
        }
    }

    pub(crate) fn mark_running(&mut self) {
        self.phase = Phase::Running;
        self.start_time = Some(Utc::now());
    }

    /// Count one finished probe, logging it if it failed
    pub(crate) fn record_probe(&mut self, failure: Option<ProbeFailure>) {
        debug_assert_eq!(self.phase, Phase::Running);
        self.request_count += 1;
        if let Some(reason) = failure {
            self.failed_requests.record(reason);
        }
    }

    pub(crate) fn mark_stopped(&mut self, cause: StopCause) {
        let now = Utc::now();
        self.start_time.get_or_insert(now);
        self.stop_time = Some(now);
        self.stop_cause = Some(cause);
        self.phase = Phase::Stopped;
    }

    pub fn successful_requests(&self) -> u64 {
        self.request_count.saturating_sub(self.failed_requests.len() as u64)
    }

    pub fn is_stopped(&self) -> bool {
        self.phase == Phase::Stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_timestamps() {
        let mut state = MonitorState::new(MonitorId::new());
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.start_time.is_none());

        state.mark_running();
        state.record_probe(None);
        state.record_probe(Some(ProbeFailure::Http { status_code: 502, body_snippet: String::new() }));
        state.mark_stopped(StopCause::ProbeFailed);

        assert!(state.is_stopped());
        assert_eq!(state.request_count, 2);
        assert_eq!(state.successful_requests(), 1);
        assert_eq!(state.stop_cause, Some(StopCause::ProbeFailed));
        assert!(state.start_time.unwrap() <= state.stop_time.unwrap());
    }

    #[test]
    fn test_stopping_idle_state_sets_both_timestamps() {
        let mut state = MonitorState::new(MonitorId::new());
        state.mark_stopped(StopCause::Requested);
        assert_eq!(state.start_time, state.stop_time);
        assert_eq!(state.request_count, 0);
    }
}
