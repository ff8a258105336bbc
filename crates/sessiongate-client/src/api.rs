//! The session operations a tab needs, and their wire types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sessiongate_core::types::SessionId;

use crate::error::ClientError;

/// One active device as listed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSession {
    /// Session id.
    pub session_id: SessionId,
    /// Device label.
    pub device_info: String,
    /// Origin IP.
    pub ip_address: String,
    /// Login time.
    pub logged_in_at: DateTime<Utc>,
    /// Row status.
    pub status: String,
}

/// Decision of a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterReply {
    /// The session is registered (or was already).
    Success,
    /// The account is at its cap; these sessions are eviction candidates.
    LimitReached {
        /// Active sessions in login order.
        active_devices: Vec<DeviceSession>,
    },
}

/// Liveness of a session as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteStatus {
    /// Still active.
    Active,
    /// Logged out.
    Inactive,
    /// Evicted or never registered.
    NotFound,
}

impl RemoteStatus {
    /// `Inactive` and `NotFound` both end the tab's session.
    pub fn is_terminated(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// Server operations used by the reconciler.
///
/// Every call is made on behalf of the bearer of one access token.
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Register `session_id` for the token's account.
    async fn register(
        &self,
        session_id: &SessionId,
        device_info: Option<&str>,
    ) -> Result<RegisterReply, ClientError>;

    /// Active sessions of the token's account.
    async fn list(&self) -> Result<Vec<DeviceSession>, ClientError>;

    /// Liveness of `session_id`.
    async fn status(&self, session_id: &SessionId) -> Result<RemoteStatus, ClientError>;

    /// Hard-delete another device's session.
    async fn evict(&self, session_id: &SessionId) -> Result<(), ClientError>;

    /// Mark the own session inactive.
    async fn logout(&self, session_id: &SessionId) -> Result<(), ClientError>;
}
