//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sessiongate_entity::session::{Liveness, Session, SessionStatus};

/// Wire shape of a session row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Session id.
    pub session_id: String,
    /// Device label.
    pub device_info: String,
    /// Origin IP.
    pub ip_address: String,
    /// Login time.
    pub logged_in_at: DateTime<Utc>,
    /// `active` or `inactive`.
    pub status: SessionStatus,
}

impl From<Session> for SessionResponse {
    fn from(s: Session) -> Self {
        Self {
            session_id: s.session_id.into(),
            device_info: s.device_info,
            ip_address: s.ip_address,
            logged_in_at: s.logged_in_at,
            status: s.status,
        }
    }
}

/// Result of a registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// `success` or `limit_reached`.
    pub status: String,
    /// Human-readable summary.
    pub message: String,
    /// Eviction candidates, present only on `limit_reached`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_devices: Option<Vec<SessionResponse>>,
}

impl RegisterResponse {
    /// Accepted registration.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            active_devices: None,
        }
    }

    /// Refused registration with the current active sessions.
    pub fn limit_reached(active: Vec<Session>) -> Self {
        Self {
            status: "limit_reached".to_string(),
            message: "Maximum number of active devices reached".to_string(),
            active_devices: Some(active.into_iter().map(SessionResponse::from).collect()),
        }
    }
}

/// Liveness answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// `active`, `inactive` or `not_found`.
    pub status: Liveness,
}

/// Result of an eviction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvictResponse {
    /// Always `success`.
    pub status: String,
    /// Human-readable summary.
    pub message: String,
    /// Whether the eviction event reached the notifier.
    pub notified: bool,
}

/// Simple status/message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Status word.
    pub status: String,
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// `{status: "ok", message}`.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }
}

/// Liveness of the service itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the store does not answer.
    pub status: String,
    /// `connected` or `unavailable`.
    pub store: String,
    /// Crate version.
    pub version: String,
    /// Seconds since start.
    pub uptime_seconds: u64,
    /// Open WebSocket connections.
    pub ws_connections: usize,
    /// Accounts with at least one subscriber.
    pub channels: usize,
}
