//! uptimed - HTTP uptime monitoring
//!
//! This library probes an HTTP endpoint on a fixed interval until it is told
//! to stop, times out, or sees a failed probe, and then reports the uptime
//! percentage together with every recorded failure.

pub mod error;
pub mod monitoring;
pub mod registry;

// Re-export main types
pub use error::MonitorError;
pub use monitoring::{
    HttpProber, Monitor, MonitorId, MonitorParams, MonitorSettings, MonitorState, Outcome, Phase,
    ProbeFailure, Prober, Report, StopCause, ValidationError,
};
pub use registry::MonitorRegistry;
