use std::sync::Arc;

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, get, post, web};
use serde::Serialize;
use tracing::info;
use uptimed::monitoring::uptime_percent;
use uptimed::{Monitor, MonitorId, MonitorParams, MonitorSettings, MonitorState};

use crate::error::ApiError;
use crate::state::AppState;

macros_utils::routes! {
    route start_monitor,
    route stop_monitor,
    route monitor_status,
}

/// Current view of a monitor, running or stopped
#[derive(Debug, Serialize)]
struct MonitorStatus {
    endpoint: String,
    interval_secs: u64,
    timeout_secs: u64,
    uptime_percent: Option<f64>,
    #[serde(flatten)]
    state: MonitorState,
}

impl MonitorStatus {
    fn of(monitor: &Monitor) -> Self {
        let settings = monitor.settings();
        let state = monitor.snapshot();
        Self {
            endpoint: settings.endpoint().to_string(),
            interval_secs: settings.interval().as_secs(),
            timeout_secs: settings.timeout().as_secs(),
            uptime_percent: uptime_percent(state.request_count, state.failed_requests.len() as u64),
            state,
        }
    }
}

fn plain_text(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type(ContentType::plaintext()).body(body)
}

fn parse_id(raw: &str) -> Result<MonitorId, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound(raw.to_string()))
}

/// Validate the query, start a monitor and answer with its id
#[post("/start")]
pub async fn start_monitor(
    state: web::Data<AppState>,
    query: web::Query<MonitorParams>,
) -> Result<HttpResponse, ApiError> {
    let settings = MonitorSettings::from_params(&query)?.with_probe_timeout(state.probe_timeout)?;
    let monitor = Monitor::new(settings, Arc::clone(&state.prober));

    monitor.start()?;
    let id = state.registry.insert(monitor).await;

    Ok(plain_text(format!("{id}\n")))
}

/// Stop a monitor, wait for it to finish and answer with its report
#[post("/stop/{id}")]
pub async fn stop_monitor(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let monitor = state.registry.get(&id).await.ok_or_else(|| ApiError::NotFound(path.to_string()))?;

    monitor.request_stop();
    info!(monitor_id = %id, grace = ?monitor.stop_grace_period(), "waiting for monitor to stop");
    let report = monitor.await_result().await?;

    // Only forget the monitor once its report exists
    state.registry.remove(&id).await;

    Ok(plain_text(format!("{report}\n")))
}

#[get("/status/{id}")]
pub async fn monitor_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let monitor = state.registry.get(&id).await.ok_or_else(|| ApiError::NotFound(path.to_string()))?;

    Ok(HttpResponse::Ok().json(MonitorStatus::of(&monitor)))
}
