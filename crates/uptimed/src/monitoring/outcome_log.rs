use chrono::{DateTime, Utc};
use serde::Serialize;

use super::types::ProbeFailure;

/// One failed probe and when it happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedProbe {
    pub timestamp: DateTime<Utc>,
    pub reason: ProbeFailure,
}

/// Append-only record of failed probes, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OutcomeLog {
    entries: Vec<FailedProbe>,
}

impl OutcomeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a failure stamped with the current time
    pub fn record(&mut self, reason: ProbeFailure) -> &FailedProbe {
        self.record_at(Utc::now(), reason)
    }

    pub fn record_at(&mut self, timestamp: DateTime<Utc>, reason: ProbeFailure) -> &FailedProbe {
        self.entries.push(FailedProbe { timestamp, reason });
        &self.entries[self.entries.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FailedProbe> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[FailedProbe] {
        &self.entries
    }
}
