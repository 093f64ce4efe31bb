//! Integration tests for the health and metrics endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use prometheus::Registry;
use simulator_lib::{
    api::{self, AppState},
    health::components,
    HealthRegistry, HttpMethod, SimulatedRequest, SimulationConfig, SimulatorMetrics,
};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: Arc<AppState>,
    metrics: SimulatorMetrics,
}

async fn setup_test_app() -> TestApp {
    let health_registry = HealthRegistry::new();
    health_registry.register(components::SIMULATION_LOOP).await;
    health_registry.register(components::METRICS_ENDPOINT).await;

    let registry = Registry::new();
    let metrics = SimulatorMetrics::register(&registry, &SimulationConfig::default()).unwrap();

    let state = Arc::new(AppState::new(health_registry, registry));
    let router = api::create_router(state.clone());

    TestApp {
        router,
        state,
        metrics,
    }
}

async fn get(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

fn sample_request() -> SimulatedRequest {
    SimulatedRequest {
        method: HttpMethod::Get,
        path: "/domain/demo-api/{id}".to_string(),
        status: simulator_lib::StatusCode::NotFound,
        duration_seconds: 0.137,
    }
}

#[tokio::test]
async fn test_healthz_ok_when_healthy() {
    let app = setup_test_app().await;

    let (status, body) = get(app.router, "/healthz").await;
    assert_eq!(status, StatusCode::OK);

    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert!(health["components"]["simulation_loop"].is_object());
    assert!(health["components"]["metrics_endpoint"].is_object());
}

#[tokio::test]
async fn test_healthz_503_after_loop_failure() {
    let app = setup_test_app().await;
    app.state
        .health_registry
        .set_unhealthy(components::SIMULATION_LOOP, "metrics error")
        .await;

    let (status, body) = get(app.router, "/healthz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "unhealthy");
    assert_eq!(
        health["components"]["simulation_loop"]["message"],
        "metrics error"
    );
}

#[tokio::test]
async fn test_readyz_tracks_ready_flag() {
    let app = setup_test_app().await;

    let (status, _) = get(app.router.clone(), "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    app.state.health_registry.set_ready(true).await;
    let (status, body) = get(app.router, "/readyz").await;
    assert_eq!(status, StatusCode::OK);

    let readiness: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(readiness["ready"], true);
}

#[tokio::test]
async fn test_metrics_exposes_simulated_instruments() {
    let app = setup_test_app().await;
    app.metrics.inc_uptime();
    app.metrics.apply(&sample_request()).unwrap();

    let response = app
        .router
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    assert!(text.contains("uptime_seconds_total 1"));
    assert!(text.contains("requests_total{app=\"metrics-demo\"} 1"));
    assert!(text.contains("http_server_requests_seconds_bucket"));
    assert!(text.contains("http_server_requests_seconds_sum"));
    assert!(text.contains("http_server_requests_seconds_count"));
    assert!(text.contains("method=\"GET\""));
    assert!(text.contains("status=\"404\""));
    assert!(text.contains("uri=\"/domain/demo-api/{id}\""));
}

#[tokio::test]
async fn test_served_over_tcp() {
    let app = setup_test_app().await;
    app.metrics.apply(&sample_request()).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(api::serve(listener, app.state.clone()));

    let text = reqwest::get(format!("http://{}/metrics", addr))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(text.contains("requests_total"));
    assert!(text.contains("http_server_requests_seconds_count"));
}

#[tokio::test]
async fn test_bind_conflict_is_error() {
    let taken = tokio::net::TcpListener::bind("0.0.0.0:0").await.unwrap();
    let port = taken.local_addr().unwrap().port();

    assert!(api::bind(port).await.is_err());
}
