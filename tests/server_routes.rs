// tests/server_routes.rs

//! Integration tests for the gateway and kokoro HTTP servers.
//!
//! Routers are exercised in-process with `tower::ServiceExt::oneshot`; only
//! the bind-failure test touches a real socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceExt;

use kabedon_kokoro::engine::CoordinatorEvent;
use kabedon_kokoro::errors::KabedonError;
use kabedon_kokoro::servers::kokoro::KokoroState;
use kabedon_kokoro::servers::{gateway, kokoro, spawn_server, ShutdownHandle};
use kabedon_test_utils::builders::service_map;

/// Assert the response body is valid JSON and return the parsed value.
async fn parse_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap_or_else(|e| panic!("Expected valid JSON body: {e}"))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// ── gateway ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn gateway_lists_every_service() {
    let app = gateway::router(Arc::new(service_map(&["a", "b"])));

    let response = app.oneshot(get("/services")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = parse_json(response).await;
    let list = json.as_array().expect("array of services");
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["name"], "a");
    assert_eq!(list[0]["endpoint"], "http://localhost:7000");
    assert_eq!(list[1]["port"], 7001);
}

#[tokio::test]
async fn gateway_looks_up_one_service_by_key() {
    let app = gateway::router(Arc::new(service_map(&["a", "b"])));

    let response = app.clone().oneshot(get("/services/b")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_json(response).await["args"][0], "--port=7001");

    let missing = app.oneshot(get("/services/zzz")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn gateway_reports_bind_failure() {
    let taken = TcpListener::bind(("0.0.0.0", 0)).await.unwrap();
    let port = taken.local_addr().unwrap().port();

    match gateway::run(port, Arc::new(service_map(&["a"]))).await {
        Err(KabedonError::BindError { server, port: p, .. }) => {
            assert_eq!(server, "gateway");
            assert_eq!(p, port);
        }
        other => panic!("expected BindError, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_server_is_reported_to_the_coordinator() {
    let (tx, mut rx) = mpsc::channel(4);
    let failing = async { Err::<(), _>(KabedonError::ConfigError("boom".to_string())) };

    spawn_server("gateway", 1, failing, tx).await.unwrap();

    match rx.recv().await {
        Some(CoordinatorEvent::ServerFailed { server, error }) => {
            assert_eq!(server, "gateway");
            assert!(error.contains("boom"));
        }
        other => panic!("expected ServerFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_server_without_coordinator_exits_quietly() {
    let (tx, rx) = mpsc::channel(4);
    drop(rx);

    let failing = async { Err::<(), _>(KabedonError::ConfigError("boom".to_string())) };
    assert!(spawn_server("kokoro", 1, failing, tx).await.is_ok());
}

// ── kokoro ───────────────────────────────────────────────────────────────────

fn kokoro_app(tx: mpsc::Sender<CoordinatorEvent>) -> axum::Router {
    kokoro::router(KokoroState {
        services: Arc::new(service_map(&["a"])),
        shutdown: ShutdownHandle::new(tx, "kokoro"),
    })
}

#[tokio::test]
async fn kokoro_status_lists_services() {
    let (tx, _rx) = mpsc::channel(4);

    let response = kokoro_app(tx).oneshot(get("/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = parse_json(response).await;
    assert_eq!(json["services"][0]["key"], "a");
}

#[tokio::test]
async fn kokoro_shutdown_raises_a_request() {
    let (tx, mut rx) = mpsc::channel(4);

    let response = kokoro_app(tx)
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/shutdown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    assert_eq!(
        rx.recv().await,
        Some(CoordinatorEvent::ShutdownRequested {
            source: "kokoro".to_string()
        })
    );
}

#[tokio::test]
async fn kokoro_shutdown_without_coordinator_is_unavailable() {
    let (tx, rx) = mpsc::channel(4);
    drop(rx);

    let response = kokoro_app(tx)
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/shutdown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn kokoro_shutdown_rejects_get() {
    let (tx, _rx) = mpsc::channel(4);

    let response = kokoro_app(tx).oneshot(get("/shutdown")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
