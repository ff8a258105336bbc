//! Request DTOs.

use serde::Deserialize;
use validator::Validate;

use sessiongate_service::RegisterRequest;

/// Body of `POST /api/session/register`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterSessionRequest {
    /// Provider-issued session id of the calling browser.
    #[validate(length(min = 1, message = "session_id is required"))]
    pub session_id: String,
    /// Optional client-derived device label.
    #[serde(default)]
    pub device_info: Option<String>,
}

impl From<RegisterSessionRequest> for RegisterRequest {
    fn from(req: RegisterSessionRequest) -> Self {
        Self {
            session_id: req.session_id,
            device_info: req.device_info,
        }
    }
}

/// Body of `POST /api/session/logout`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LogoutRequest {
    /// Session to mark inactive.
    #[validate(length(min = 1, message = "session_id is required"))]
    pub session_id: String,
}

/// Query of `GET /api/session/status`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StatusQuery {
    /// Session to probe.
    #[validate(length(min = 1, message = "session_id is required"))]
    pub session_id: String,
}
