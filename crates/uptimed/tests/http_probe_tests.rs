//! Probing real HTTP servers
//!
//! These tests run the HTTP prober and whole monitors against local mock servers.

use std::sync::Arc;
use std::time::Duration;

use url::Url;
use uptimed::{HttpProber, Monitor, MonitorParams, Outcome, ProbeFailure, Prober, StopCause};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn health_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/health", server.uri())).unwrap()
}

fn prober() -> HttpProber {
    HttpProber::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_probe_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(prober().probe(&health_url(&server)).await, Outcome::Success);
}

#[tokio::test]
async fn test_probe_follows_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/ready"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ready"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    assert!(prober().probe(&health_url(&server)).await.is_success());
}

#[tokio::test]
async fn test_probe_non_2xx_is_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let outcome = prober().probe(&health_url(&server)).await;
    assert_eq!(outcome, Outcome::http_failure(503, "maintenance"));
}

#[tokio::test]
async fn test_probe_connection_refused_is_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let url = Url::parse(&format!("http://127.0.0.1:{port}/health")).unwrap();
    match prober().probe(&url).await {
        Outcome::Failure(ProbeFailure::Transport { reason }) => {
            assert!(reason.starts_with("connection failed"), "unexpected reason: {reason}");
        }
        other => panic!("expected transport failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_probe_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let prober = HttpProber::new(Duration::from_millis(200)).unwrap();
    match prober.probe(&health_url(&server)).await {
        Outcome::Failure(ProbeFailure::Transport { reason }) => {
            assert!(reason.starts_with("timed out"), "unexpected reason: {reason}");
        }
        other => panic!("expected transport failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_probe_with_client_that_keeps_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/ready"))
        .mount(&server)
        .await;

    let client = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none()).build().unwrap();
    let outcome = HttpProber::with_client(client).probe(&health_url(&server)).await;
    assert_eq!(outcome, Outcome::http_failure(302, ""));
}

fn monitor_for(server: &MockServer, interval: &str, timeout: &str) -> Monitor {
    let _ = tracing_subscriber::fmt::try_init();

    let params = MonitorParams {
        endpoint: Some(health_url(server).to_string()),
        interval: Some(interval.to_string()),
        timeout: Some(timeout.to_string()),
    };
    Monitor::create(&params, Arc::new(prober())).unwrap()
}

#[tokio::test]
async fn test_monitor_records_first_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let monitor = monitor_for(&server, "1", "10");
    monitor.start().unwrap();
    let report = monitor.await_result().await.unwrap();

    assert_eq!(report.stop_cause, StopCause::ProbeFailed);
    assert_eq!(report.total_requests, 1);
    assert_eq!(report.failed_requests.len(), 1);
    assert!(matches!(
        report.failed_requests[0].reason,
        ProbeFailure::Http { status_code: 500, .. }
    ));
    assert!(report.to_string().contains("uptime=0.00%"));
}

#[tokio::test]
async fn test_monitor_healthy_until_stopped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let monitor = monitor_for(&server, "1", "30");
    monitor.start().unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    monitor.request_stop();
    let report = monitor.await_result().await.unwrap();

    assert_eq!(report.stop_cause, StopCause::Requested);
    assert_eq!(report.total_requests, 2);
    assert_eq!(report.uptime_percent, Some(100.0));
}

#[tokio::test]
async fn test_monitor_unresponsive_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let monitor = monitor_for(&server, "1", "2");
    monitor.start().unwrap();
    let report = monitor.await_result().await.unwrap();

    assert_eq!(report.stop_cause, StopCause::TimedOut);
    assert_eq!(report.total_requests, 0);
    assert!(report.failed_requests.is_empty());
    assert!(report.to_string().starts_with("uptime=n/a"));
}
