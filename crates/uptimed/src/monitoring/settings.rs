//! Validation of caller-supplied monitor settings.
//!
//! Raw parameters arrive as optional strings (usually query parameters).
//! Every problem found is collected so a caller can fix them all in one
//! round-trip instead of discovering them one at a time.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Polling period used when the caller does not supply one
pub const DEFAULT_INTERVAL_SECS: u64 = 2;

/// Maximum monitoring duration used when the caller does not supply one
pub const DEFAULT_TIMEOUT_SECS: u64 = 1800;

/// Deadline applied to each individual probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw, unvalidated monitor parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitorParams {
    pub endpoint: Option<String>,
    pub interval: Option<String>,
    pub timeout: Option<String>,
}

/// A single problem with the supplied settings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("no endpoint query parameter provided")]
    MissingEndpoint,
    #[error("invalid endpoint {value}: {reason}")]
    InvalidEndpoint { value: String, reason: String },
    #[error("unable to parse {field} value {value:?} as an integer")]
    NotAnInteger { field: &'static str, value: String },
    #[error("{field} must be a positive number of seconds, got {value}")]
    NotPositive { field: &'static str, value: i64 },
    #[error("timeout ({timeout:?}) must be longer than interval ({interval:?})")]
    IntervalNotBelowTimeout { interval: Duration, timeout: Duration },
}

/// Every violation found while validating monitor settings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unable to get monitor settings: {} error(s) occurred:{}", .violations.len(), bullet_list(.violations))]
pub struct ValidationError {
    violations: Vec<Violation>,
}

fn bullet_list(violations: &[Violation]) -> String {
    violations.iter().map(|violation| format!("\n\t* {violation}")).collect()
}

impl ValidationError {
    fn from_violations(violations: Vec<Violation>) -> Result<(), Self> {
        if violations.is_empty() { Ok(()) } else { Err(Self { violations }) }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

/// Immutable, validated monitor settings. `interval < timeout` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    endpoint: Url,
    interval: Duration,
    timeout: Duration,
    probe_timeout: Duration,
}

impl MonitorSettings {
    /// Build settings from already typed values
    pub fn new(endpoint: Url, interval: Duration, timeout: Duration) -> Result<Self, ValidationError> {
        let mut violations = Vec::new();

        if let Err(reason) = check_endpoint(&endpoint) {
            violations.push(Violation::InvalidEndpoint { value: endpoint.to_string(), reason });
        }
        if interval.is_zero() {
            violations.push(Violation::NotPositive { field: "interval", value: 0 });
        }
        if timeout.is_zero() {
            violations.push(Violation::NotPositive { field: "timeout", value: 0 });
        }
        if interval >= timeout {
            violations.push(Violation::IntervalNotBelowTimeout { interval, timeout });
        }

        ValidationError::from_violations(violations)?;

        Ok(Self { endpoint, interval, timeout, probe_timeout: DEFAULT_PROBE_TIMEOUT })
    }

    /// Parse and validate raw parameters, applying defaults for omitted values
    pub fn from_params(params: &MonitorParams) -> Result<Self, ValidationError> {
        let mut violations = Vec::new();

        let endpoint = parse_endpoint(params.endpoint.as_deref(), &mut violations);
        let interval = parse_seconds("interval", params.interval.as_deref(), DEFAULT_INTERVAL_SECS, &mut violations);
        let timeout = parse_seconds("timeout", params.timeout.as_deref(), DEFAULT_TIMEOUT_SECS, &mut violations);

        if let (Some(interval), Some(timeout)) = (interval, timeout) {
            if interval >= timeout {
                violations.push(Violation::IntervalNotBelowTimeout { interval, timeout });
            }
        }

        match (endpoint, interval, timeout) {
            (Some(endpoint), Some(interval), Some(timeout)) if violations.is_empty() => {
                Ok(Self { endpoint, interval, timeout, probe_timeout: DEFAULT_PROBE_TIMEOUT })
            }
            _ => Err(ValidationError { violations }),
        }
    }

    /// Replace the per-probe deadline
    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Result<Self, ValidationError> {
        if probe_timeout.is_zero() {
            return Err(ValidationError {
                violations: vec![Violation::NotPositive { field: "probe_timeout", value: 0 }],
            });
        }
        self.probe_timeout = probe_timeout;
        Ok(self)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }
}

/// Only absolute http(s) URLs with a host can be probed
fn check_endpoint(url: &Url) -> Result<(), String> {
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("scheme '{other}' must be http or https")),
    }

    if url.host_str().is_none() {
        return Err("URL must have a valid host".to_string());
    }

    Ok(())
}

fn parse_endpoint(raw: Option<&str>, violations: &mut Vec<Violation>) -> Option<Url> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        violations.push(Violation::MissingEndpoint);
        return None;
    };

    let parsed = Url::parse(raw)
        .map_err(|e| e.to_string())
        .and_then(|url| check_endpoint(&url).map(|()| url));

    match parsed {
        Ok(url) => Some(url),
        Err(reason) => {
            violations.push(Violation::InvalidEndpoint { value: raw.to_string(), reason });
            None
        }
    }
}

fn parse_seconds(
    field: &'static str,
    raw: Option<&str>,
    default_secs: u64,
    violations: &mut Vec<Violation>,
) -> Option<Duration> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Some(Duration::from_secs(default_secs));
    };

    match raw.parse::<i64>() {
        Ok(value) if value > 0 => Some(Duration::from_secs(value.unsigned_abs())),
        Ok(value) => {
            violations.push(Violation::NotPositive { field, value });
            None
        }
        Err(_) => {
            violations.push(Violation::NotAnInteger { field, value: raw.to_string() });
            None
        }
    }
}
