//! Connectivity page and health-check handlers.

use super::AppState;
use crate::api::extractors::Flash;
use crate::api::views;
use crate::storage::DiskClient;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Describe whether the storage account is reachable.
pub async fn connection_state(disk: &dyn DiskClient) -> String {
    match disk.total_space().await {
        Ok(0) => "No connection".to_string(),
        Ok(_) => "Connection established".to_string(),
        Err(e) => {
            warn!("Connectivity probe failed: {}", e);
            format!("Error: {}", e)
        }
    }
}

/// Status page handler
/// GET /
#[instrument(skip_all)]
pub async fn index_handler(State(state): State<Arc<AppState>>, flash: Flash) -> Response {
    let connection = connection_state(state.disk.as_ref()).await;
    let messages = flash.drain();
    (flash, Html(views::status_page(&connection, &messages))).into_response()
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check handler
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
