//! Registry of open WebSocket connections.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use sessiongate_core::types::AccountId;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// What is known about one open connection.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionInfo {
    /// Connection ID.
    pub id: ConnectionId,
    /// Account the socket authenticated as.
    pub account_id: AccountId,
    /// When the socket was accepted.
    pub connected_at: DateTime<Utc>,
}

/// Tracks open sockets for observability.
#[derive(Debug, Clone, Default)]
pub struct ConnectionPool {
    connections: Arc<DashMap<ConnectionId, ConnectionInfo>>,
}

impl ConnectionPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection. It stays registered until the guard drops.
    pub fn register(&self, account_id: AccountId) -> ConnectionGuard {
        let info = ConnectionInfo {
            id: Uuid::new_v4(),
            account_id,
            connected_at: Utc::now(),
        };
        let id = info.id;
        info!(conn_id = %id, account_id = %info.account_id, "WebSocket connection registered");
        self.connections.insert(id, info);
        ConnectionGuard {
            id,
            connections: self.connections.clone(),
        }
    }

    /// Total open connections.
    pub fn count(&self) -> usize {
        self.connections.len()
    }

    /// Open connections for one account.
    pub fn count_for(&self, account_id: &AccountId) -> usize {
        self.connections
            .iter()
            .filter(|c| &c.account_id == account_id)
            .count()
    }
}

/// Keeps a connection registered while alive.
#[derive(Debug)]
pub struct ConnectionGuard {
    id: ConnectionId,
    connections: Arc<DashMap<ConnectionId, ConnectionInfo>>,
}

impl ConnectionGuard {
    /// The connection id.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if let Some((id, info)) = self.connections.remove(&self.id) {
            let open_for = Utc::now() - info.connected_at;
            info!(
                conn_id = %id,
                account_id = %info.account_id,
                seconds = open_for.num_seconds(),
                "WebSocket connection closed"
            );
        }
    }
}
