//! Wire envelope for events pushed to clients.

use serde::{Deserialize, Serialize};

use sessiongate_core::events::SessionEvent;
use sessiongate_core::types::SessionId;

/// `{"event": "...", "payload": {...}}` as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Event name, `session-change` for evictions.
    pub event: String,
    /// Event-specific body.
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    /// Wrap a domain event under `event_name`.
    pub fn from_event(event_name: &str, event: &SessionEvent) -> Self {
        Self {
            event: event_name.to_string(),
            payload: event.payload(),
        }
    }

    /// The evicted session carried by the payload, if any.
    pub fn terminated_session_id(&self) -> Option<SessionId> {
        self.payload
            .get("terminated_session_id")
            .and_then(|v| v.as_str())
            .and_then(|s| SessionId::parse(s).ok())
    }

    /// Serialize for a text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
