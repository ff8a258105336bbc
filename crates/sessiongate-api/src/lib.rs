//! # sessiongate-api
//!
//! HTTP API layer for SessionGate built on Axum.
//!
//! Provides the session endpoints, the WebSocket upgrade delivering
//! eviction events, bearer-token extraction, CORS and request logging, and
//! the mapping from `AppError` to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
