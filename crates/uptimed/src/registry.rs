//! Owned registry of running monitors, keyed by id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::monitoring::{Monitor, MonitorId, Report};

/// Concurrency-safe map from monitor id to monitor handle.
///
/// Monitors that stop on their own stay registered with their report; entries
/// are only evicted by [`MonitorRegistry::remove`] or [`MonitorRegistry::shutdown`].
#[derive(Clone, Default)]
pub struct MonitorRegistry {
    monitors: Arc<RwLock<HashMap<MonitorId, Monitor>>>,
}

impl MonitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a monitor under its own id
    pub async fn insert(&self, monitor: Monitor) -> MonitorId {
        let id = monitor.id();
        self.monitors.write().await.insert(id, monitor);
        id
    }

    pub async fn get(&self, id: &MonitorId) -> Option<Monitor> {
        self.monitors.read().await.get(id).cloned()
    }

    pub async fn remove(&self, id: &MonitorId) -> Option<Monitor> {
        self.monitors.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.monitors.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.monitors.read().await.is_empty()
    }

    /// Stop every registered monitor and collect the reports that arrive within `grace`.
    ///
    /// The registry is empty afterwards. Monitors that miss the grace period are
    /// logged and dropped; their workers still finish on their own.
    pub async fn shutdown(&self, grace: Duration) -> Vec<Report> {
        let monitors: Vec<Monitor> = self.monitors.write().await.drain().map(|(_, monitor)| monitor).collect();
        if monitors.is_empty() {
            return Vec::new();
        }

        info!("Waiting for {} monitor(s) to finish", monitors.len());
        for monitor in &monitors {
            monitor.request_stop();
        }

        let mut reports = Vec::with_capacity(monitors.len());
        for monitor in monitors {
            match timeout(grace, monitor.await_result()).await {
                Ok(Ok(report)) => {
                    info!(monitor_id = %monitor.id(), "{}", report);
                    reports.push(report);
                }
                Ok(Err(e)) => warn!(monitor_id = %monitor.id(), error = %e, "monitor produced no report"),
                Err(_) => warn!(monitor_id = %monitor.id(), ?grace, "monitor did not stop within grace period"),
            }
        }

        reports
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::monitoring::{MonitorSettings, Outcome, Prober};

    struct AlwaysUp;

    #[async_trait::async_trait]
    impl Prober for AlwaysUp {
        async fn probe(&self, _endpoint: &Url) -> Outcome {
            Outcome::Success
        }
    }

    fn monitor() -> Monitor {
        let settings = MonitorSettings::new(
            Url::parse("http://monitored.test").unwrap(),
            Duration::from_secs(1),
            Duration::from_secs(60),
        )
        .unwrap();
        Monitor::new(settings, Arc::new(AlwaysUp))
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let registry = MonitorRegistry::new();
        assert!(registry.is_empty().await);

        let id = registry.insert(monitor()).await;
        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.get(&id).await.map(|m| m.id()), Some(id));

        let removed = registry.remove(&id).await.unwrap();
        assert_eq!(removed.id(), id);
        assert!(registry.get(&id).await.is_none());
        assert!(registry.remove(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let registry = MonitorRegistry::new();
        let other = registry.clone();

        let id = registry.insert(monitor()).await;
        assert!(other.get(&id).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_collects_reports() {
        let registry = MonitorRegistry::new();
        for _ in 0..3 {
            let monitor = monitor();
            monitor.start().unwrap();
            registry.insert(monitor).await;
        }
        let idle = monitor();
        registry.insert(idle).await;

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let reports = registry.shutdown(Duration::from_secs(5)).await;

        assert_eq!(reports.len(), 4);
        assert!(registry.is_empty().await);
        let probed: Vec<u64> = reports.iter().map(|report| report.total_requests).collect();
        assert_eq!(probed.iter().filter(|&&count| count == 2).count(), 3);
        assert_eq!(probed.iter().filter(|&&count| count == 0).count(), 1);
    }
}
