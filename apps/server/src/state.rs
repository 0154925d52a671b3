use std::sync::Arc;
use std::time::Duration;

use uptimed::{HttpProber, MonitorRegistry, Prober};

use crate::config::Config;
use crate::error::AppError;

/// Shared by every request handler through `web::Data`
#[derive(Clone)]
pub struct AppState {
    pub registry: MonitorRegistry,
    pub prober: Arc<dyn Prober>,
    pub probe_timeout: Duration,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let probe_timeout = config.monitor.probe_timeout();
        let prober = HttpProber::new(probe_timeout)?;
        Ok(Self::with_prober(Arc::new(prober), probe_timeout))
    }

    pub fn with_prober(prober: Arc<dyn Prober>, probe_timeout: Duration) -> Self {
        Self { registry: MonitorRegistry::new(), prober, probe_timeout }
    }
}
