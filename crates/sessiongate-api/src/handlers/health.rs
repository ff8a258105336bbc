//! Health check handlers.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_up = state.session_service.store_available().await;
    Json(HealthResponse {
        status: if store_up { "ok" } else { "degraded" }.to_string(),
        store: if store_up { "connected" } else { "unavailable" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        ws_connections: state.realtime.connections.count(),
        channels: state.realtime.channels.channel_count(),
    })
}
