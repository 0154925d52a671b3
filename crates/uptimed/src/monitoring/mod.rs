pub mod checker;
/// Monitoring engine module - probes one endpoint until stopped
///
/// This module is responsible for:
/// - Validating caller-supplied settings
/// - Probing the endpoint and classifying outcomes
/// - Scheduling probes and deciding when to stop
/// - Building the final uptime report
pub mod engine;
pub mod outcome_log;
pub mod report;
pub mod settings;
pub mod state;
pub mod types;

pub use checker::{HttpProber, Prober};
pub use engine::Monitor;
pub use outcome_log::{FailedProbe, OutcomeLog};
pub use report::{Report, uptime_percent};
pub use settings::{MonitorParams, MonitorSettings, ValidationError, Violation};
pub use state::MonitorState;
pub use types::{MonitorId, Outcome, Phase, ProbeFailure, StopCause};
