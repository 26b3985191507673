// src/servers/gateway.rs

//! Gateway server: publishes where each service can be reached.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::errors::Result;
use crate::servers::bind;
use crate::service::{ServiceDescriptor, ServiceMap};

pub const SERVER_NAME: &str = "gateway";

type GatewayState = Arc<ServiceMap>;

/// Build the gateway router.
pub fn router(services: Arc<ServiceMap>) -> Router {
    Router::new()
        .route("/services", get(list_services))
        .route("/services/{key}", get(get_service))
        .with_state(services)
}

/// Bind `port` and serve until the process ends.
pub async fn run(port: u16, services: Arc<ServiceMap>) -> Result<()> {
    let listener = bind(SERVER_NAME, port).await?;
    info!(port, "gateway server listening");
    axum::serve(listener, router(services)).await?;
    Ok(())
}

/// List every configured service.
async fn list_services(State(services): State<GatewayState>) -> Json<Vec<ServiceDescriptor>> {
    Json(services.values().cloned().collect())
}

/// Look up one service by config key.
async fn get_service(
    State(services): State<GatewayState>,
    Path(key): Path<String>,
) -> std::result::Result<Json<ServiceDescriptor>, StatusCode> {
    services
        .get(&key)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
