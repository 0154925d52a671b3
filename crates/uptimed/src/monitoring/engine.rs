//! Monitor lifecycle engine.
//!
//! A [`Monitor`] moves through `Idle → Running → Stopped`. Once started it runs
//! as its own tokio task which, at every decision point, checks the stop
//! request first, then the monitoring timeout, and only then probes the
//! endpoint for the current tick. A single failed probe ends monitoring.
//!
//! Stopping is cooperative. A stop request is seen at the next decision point
//! and never interrupts a probe that is already in flight, so a caller that
//! needs a bounded wait must allow [`Monitor::stop_grace_period`]: one interval
//! plus one probe deadline. Each probe is bounded by its own deadline
//! (`MonitorSettings::probe_timeout`) and is raced against the monitoring
//! timeout, so a hung endpoint cannot keep the worker alive past either.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::checker::Prober;
use super::report::Report;
use super::settings::{MonitorParams, MonitorSettings, ValidationError};
use super::state::MonitorState;
use super::types::{MonitorId, Outcome, Phase, StopCause};
use crate::error::MonitorError;

type Published = Option<Result<Report, MonitorError>>;

/// Longest span the scheduler plans ahead; larger settings are capped to it
const SCHEDULING_HORIZON: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Handle to one monitor. Clones share the same engine.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<Inner>,
}

struct Inner {
    id: MonitorId,
    settings: MonitorSettings,
    prober: Arc<dyn Prober>,
    state: RwLock<MonitorState>,
    stop_tx: watch::Sender<bool>,
    report_tx: watch::Sender<Published>,
}

impl Monitor {
    /// Create an idle monitor for already validated settings
    pub fn new(settings: MonitorSettings, prober: Arc<dyn Prober>) -> Self {
        let id = MonitorId::new();
        let (stop_tx, _) = watch::channel(false);
        let (report_tx, _) = watch::channel(None);

        Self {
            inner: Arc::new(Inner {
                id,
                settings,
                prober,
                state: RwLock::new(MonitorState::new(id)),
                stop_tx,
                report_tx,
            }),
        }
    }

    /// Validate raw parameters and create an idle monitor
    pub fn create(params: &MonitorParams, prober: Arc<dyn Prober>) -> Result<Self, ValidationError> {
        MonitorSettings::from_params(params).map(|settings| Self::new(settings, prober))
    }

    pub fn id(&self) -> MonitorId {
        self.inner.id
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.inner.settings
    }

    pub fn phase(&self) -> Phase {
        self.inner.read_state().phase
    }

    /// Consistent copy of the current state
    pub fn snapshot(&self) -> MonitorState {
        self.inner.read_state().clone()
    }

    /// Longest a caller should wait between `request_stop` and the report
    pub fn stop_grace_period(&self) -> Duration {
        self.inner.settings.interval() + self.inner.settings.probe_timeout()
    }

    /// Start probing on a background task. Must be called from within a tokio runtime.
    pub fn start(&self) -> Result<(), MonitorError> {
        {
            let mut state = self.inner.write_state();
            match state.phase {
                Phase::Idle => state.mark_running(),
                Phase::Running => return Err(MonitorError::AlreadyStarted(self.id())),
                Phase::Stopped => return Err(MonitorError::AlreadyStopped(self.id())),
            }
        }

        let origin = Instant::now();
        let settings = &self.inner.settings;
        info!(
            monitor_id = %self.id(),
            endpoint = %settings.endpoint(),
            interval = ?settings.interval(),
            timeout = ?settings.timeout(),
            "monitor started"
        );

        let worker = tokio::spawn(Arc::clone(&self.inner).run(origin));

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            if let Err(e) = worker.await {
                error!(monitor_id = %inner.id, error = %e, "monitor worker exited abnormally");
                inner.report_tx.send_replace(Some(Err(MonitorError::WorkerExited(inner.id))));
            }
        });

        Ok(())
    }

    /// Ask the monitor to stop. Never blocks; repeated calls are no-ops.
    pub fn request_stop(&self) {
        let first_request = self.inner.stop_tx.send_if_modified(|stop| !std::mem::replace(stop, true));
        if first_request {
            debug!(monitor_id = %self.id(), "stop requested");
        }

        let mut state = self.inner.write_state();
        if state.phase == Phase::Idle {
            state.mark_stopped(StopCause::Requested);
            info!(monitor_id = %self.id(), "monitor stopped before it was started");
            self.inner.publish(&state);
        }
    }

    /// Wait until the monitor has stopped and return its report.
    ///
    /// Can be called any number of times; every call returns the same report.
    pub async fn await_result(&self) -> Result<Report, MonitorError> {
        let mut report_rx = self.inner.report_tx.subscribe();

        // Idle → Stopped publishes under the state lock, so Idle here means nothing will arrive
        if self.phase() == Phase::Idle {
            return Err(MonitorError::NotStarted(self.id()));
        }

        let published = report_rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| MonitorError::WorkerExited(self.id()))?;
        let report = (*published).clone();

        report.unwrap_or(Err(MonitorError::WorkerExited(self.id())))
    }
}

impl fmt::Debug for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("id", &self.inner.id)
            .field("endpoint", &self.inner.settings.endpoint().as_str())
            .field("phase", &self.phase())
            .finish()
    }
}

impl Inner {
    fn read_state(&self) -> RwLockReadGuard<'_, MonitorState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, MonitorState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &MonitorState) {
        self.report_tx.send_replace(Some(Report::from_state(state)));
    }

    async fn run(self: Arc<Self>, origin: Instant) {
        let cause = self.schedule(origin).await;

        let mut state = self.write_state();
        state.mark_stopped(cause);
        info!(
            monitor_id = %self.id,
            %cause,
            requests = state.request_count,
            failures = state.failed_requests.len(),
            "monitor stopped"
        );
        self.publish(&state);
    }

    /// Probe on every tick until stopped, timed out or a probe fails
    async fn schedule(&self, origin: Instant) -> StopCause {
        let settings = &self.settings;
        // Instant arithmetic panics on overflow and validated seconds may reach i64::MAX
        let interval = settings.interval().min(SCHEDULING_HORIZON);
        let deadline = origin + settings.timeout().min(SCHEDULING_HORIZON);

        let mut ticker = time::interval_at(origin + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stop_rx = self.stop_tx.subscribe();

        loop {
            // Wake on whichever signal is ready; priority is decided below
            tokio::select! {
                _ = stop_rx.wait_for(|stop| *stop) => {}
                () = time::sleep_until(deadline) => {}
                _ = ticker.tick() => {}
            }

            if let Some(cause) = pending_termination(&stop_rx, deadline) {
                return cause;
            }

            let probe = time::timeout(settings.probe_timeout(), self.prober.probe(settings.endpoint()));
            let outcome = tokio::select! {
                biased;
                () = time::sleep_until(deadline) => {
                    debug!(monitor_id = %self.id, "timeout reached while a probe was in flight");
                    return StopCause::TimedOut;
                }
                result = probe => result.unwrap_or_else(|_| {
                    Outcome::transport_failure(format!(
                        "probe timed out after {:?}",
                        settings.probe_timeout()
                    ))
                }),
            };

            let failure = match outcome {
                Outcome::Success => None,
                Outcome::Failure(failure) => {
                    warn!(monitor_id = %self.id, %failure, "probe failed");
                    Some(failure)
                }
            };
            let failed = failure.is_some();

            self.write_state().record_probe(failure);

            if failed {
                return StopCause::ProbeFailed;
            }
        }
    }
}

/// Stop wins over timeout; either one wins over a pending tick
fn pending_termination(stop_rx: &watch::Receiver<bool>, deadline: Instant) -> Option<StopCause> {
    if *stop_rx.borrow() {
        Some(StopCause::Requested)
    } else if Instant::now() >= deadline {
        Some(StopCause::TimedOut)
    } else {
        None
    }
}
