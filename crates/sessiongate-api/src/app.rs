//! Application builder: wires router, middleware and state into an Axum app.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use sessiongate_auth::jwt::JwtVerifier;
use sessiongate_core::config::AppConfig;
use sessiongate_core::error::AppError;
use sessiongate_database::connect_store;

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Runs the SessionGate server until a shutdown signal arrives.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!(provider = %config.database.provider, "Starting SessionGate server...");

    let store = connect_store(&config.database).await?;
    let verifier = JwtVerifier::new(&config.auth);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    let state = AppState::new(config, store, verifier);
    let realtime = state.realtime.clone();
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!("SessionGate server listening on {}", addr);

    let (signalled_tx, signalled_rx) = watch::channel(false);
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        realtime.shutdown();
        let _ = signalled_tx.send(true);
    });

    tokio::select! {
        result = server.into_future() => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = grace_expired(signalled_rx, grace) => {
            warn!(grace_seconds = grace.as_secs(), "Grace period elapsed, dropping open connections");
        }
    }

    info!("SessionGate server stopped");
    Ok(())
}

async fn grace_expired(mut signalled: watch::Receiver<bool>, grace: Duration) {
    if signalled.wait_for(|s| *s).await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(grace).await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
