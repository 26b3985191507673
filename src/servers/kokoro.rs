// src/servers/kokoro.rs

//! Kokoro server: status of the supervised services and an administrative
//! shutdown endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::Result;
use crate::servers::{bind, ShutdownHandle};
use crate::service::{ServiceDescriptor, ServiceMap};

pub const SERVER_NAME: &str = "kokoro";

#[derive(Debug, Clone)]
pub struct KokoroState {
    pub services: Arc<ServiceMap>,
    pub shutdown: ShutdownHandle,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub services: Vec<ServiceDescriptor>,
}

#[derive(Debug, Serialize)]
pub struct ShutdownResponse {
    pub status: &'static str,
}

/// Build the kokoro router.
pub fn router(state: KokoroState) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/shutdown", post(shutdown))
        .with_state(state)
}

/// Bind `port` and serve until the process ends.
pub async fn run(port: u16, services: Arc<ServiceMap>, shutdown: ShutdownHandle) -> Result<()> {
    let listener = bind(SERVER_NAME, port).await?;
    info!(port, "kokoro server listening");
    axum::serve(listener, router(KokoroState { services, shutdown })).await?;
    Ok(())
}

async fn status(State(state): State<KokoroState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        services: state.services.values().cloned().collect(),
    })
}

async fn shutdown(State(state): State<KokoroState>) -> (StatusCode, Json<ShutdownResponse>) {
    match state.shutdown.request_shutdown().await {
        Ok(()) => {
            info!("shutdown requested over HTTP");
            (
                StatusCode::ACCEPTED,
                Json(ShutdownResponse {
                    status: "shutting down",
                }),
            )
        }
        Err(err) => {
            warn!(error = %err, "shutdown request could not be delivered");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ShutdownResponse {
                    status: "unavailable",
                }),
            )
        }
    }
}
