//! Route definitions for the SessionGate HTTP API.

use axum::Router;
use axum::routing::{delete, get, post};

use crate::handlers;
use crate::state::AppState;

/// Build the router with every route bound to `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::root))
        .nest("/api", api_routes())
        .route("/ws", get(handlers::ws::ws_handler))
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/sessions", get(handlers::session::list))
        .route("/session/register", post(handlers::session::register))
        .route("/session/status", get(handlers::session::status))
        .route("/session/logout", post(handlers::session::logout))
        .route("/session/{session_id}", delete(handlers::session::evict))
}
