//! WebSocket upgrade handler delivering account events.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::time::{Instant, interval_at};
use tracing::{debug, info, warn};

use sessiongate_core::types::AccountId;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameter for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// Bearer access token.
    pub token: String,
}

/// GET /ws?token={jwt}
pub async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    // Authenticate before upgrade
    let claims = state.verifier.verify(&query.token).await?;
    let account_id = claims.account_id()?;

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, account_id, socket)))
}

/// Bridges the account's channel onto an established socket.
async fn handle_ws_connection(state: AppState, account_id: AccountId, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let guard = state.realtime.connections.register(account_id.clone());
    let mut subscription = state.realtime.notifier.subscribe(&account_id);
    let mut shutdown = state.realtime.shutdown_receiver();

    let period = Duration::from_secs(state.realtime.config().ping_interval_seconds.max(1));
    let mut ping = interval_at(Instant::now() + period, period);

    info!(
        conn_id = %guard.id(),
        account_id = %account_id,
        channel = %subscription.channel(),
        account_connections = state.realtime.connections.count_for(&account_id),
        "WebSocket connection established"
    );

    loop {
        tokio::select! {
            envelope = subscription.recv() => {
                let Some(envelope) = envelope else { break };
                let text = match envelope.to_json() {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(conn_id = %guard.id(), error = %e, "Failed to encode event");
                        continue;
                    }
                };
                if ws_tx.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            inbound = ws_rx.next() => match inbound {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %guard.id(), error = %e, "WebSocket error");
                    break;
                }
            },
            _ = ping.tick() => {
                if ws_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
            _ = shutdown.recv() => {
                debug!(conn_id = %guard.id(), "Closing socket for shutdown");
                let _ = ws_tx.send(Message::Close(None)).await;
                break;
            }
        }
    }

    info!(
        conn_id = %guard.id(),
        account_id = %account_id,
        "WebSocket connection closed"
    );
}
