//! API route handlers for the gateway.

pub mod admin;
pub mod bids;
pub mod tenders;
pub mod vendors;

use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use crate::server::AppState;

/// Root banner.
pub async fn api_root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "API is running..." }))
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "procura-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}
