//! Liveness check for load balancers and process supervisors
//!
//! Answers without touching the store or the session table.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::{AppState, SERVICE_NAME};

/// Liveness payload
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        module: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Public routes for liveness checks
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
