//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::{Duration, Instant};

use sessiongate_auth::jwt::JwtVerifier;
use sessiongate_core::config::AppConfig;
use sessiongate_database::store::SessionStore;
use sessiongate_realtime::RealtimeEngine;
use sessiongate_service::{EvictionService, SessionService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Bearer-token verifier.
    pub verifier: Arc<JwtVerifier>,
    /// Registrar, liveness prober, logout.
    pub session_service: Arc<SessionService>,
    /// Eviction handler.
    pub eviction_service: Arc<EvictionService>,
    /// Real-time channels and sockets.
    pub realtime: RealtimeEngine,
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}

impl AppState {
    /// Wire services over `store` with the given verifier.
    pub fn new(config: AppConfig, store: Arc<dyn SessionStore>, verifier: JwtVerifier) -> Self {
        let realtime = RealtimeEngine::new(config.realtime.clone());
        let session_service = SessionService::new(store.clone(), config.session.clone());
        let eviction_service = EvictionService::new(
            store,
            realtime.notifier.clone(),
            Duration::from_secs(config.realtime.publish_timeout_seconds),
        );

        Self {
            config: Arc::new(config),
            verifier: Arc::new(verifier),
            session_service: Arc::new(session_service),
            eviction_service: Arc::new(eviction_service),
            realtime,
            started_at: Instant::now(),
        }
    }
}
