//! Session-related domain events.

use serde::{Deserialize, Serialize};

use crate::types::SessionId;

/// Events published on an account's channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A session was evicted by another session of the same account.
    Terminated {
        /// The session that must log itself out.
        terminated_session_id: SessionId,
    },
}

impl SessionEvent {
    /// Build an eviction event for `session_id`.
    pub fn terminated(session_id: SessionId) -> Self {
        Self::Terminated {
            terminated_session_id: session_id,
        }
    }

    /// The wire payload delivered to clients, without the event tag.
    pub fn payload(&self) -> serde_json::Value {
        match self {
            Self::Terminated {
                terminated_session_id,
            } => serde_json::json!({ "terminated_session_id": terminated_session_id }),
        }
    }

    /// The session this event concerns.
    pub fn session_id(&self) -> &SessionId {
        match self {
            Self::Terminated {
                terminated_session_id,
            } => terminated_session_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let event = SessionEvent::terminated(SessionId::parse("S1").unwrap());
        assert_eq!(
            event.payload(),
            serde_json::json!({ "terminated_session_id": "S1" })
        );
        assert_eq!(event.session_id().as_str(), "S1");
    }
}
