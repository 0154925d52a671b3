use thiserror::Error;

use crate::monitoring::types::MonitorId;

/// Errors from driving a monitor through its lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    #[error("monitor {0} is already running")]
    AlreadyStarted(MonitorId),
    #[error("monitor {0} has already stopped")]
    AlreadyStopped(MonitorId),
    #[error("monitor {0} was never started")]
    NotStarted(MonitorId),
    #[error("monitor {0} has not stopped yet")]
    NotStopped(MonitorId),
    #[error("monitor {0} exited without publishing a report")]
    WorkerExited(MonitorId),
}
