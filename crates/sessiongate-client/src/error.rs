//! Client error types.

use thiserror::Error;

use sessiongate_core::error::{AppError, ErrorKind};
use sessiongate_core::types::SessionId;

/// Failures seen by the client side.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The event socket failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The server answered with an error body.
    #[error("server returned {status} {code}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// `error` field of the body.
        code: String,
        /// `message` field of the body.
        message: String,
    },

    /// The server answered with something unexpected.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The configured base URL cannot be used.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Registration was refused again after an eviction.
    #[error("device limit still reached after eviction")]
    LimitStillReached,

    /// The chosen victim was not offered as a candidate.
    #[error("session {0} is not an eviction candidate")]
    UnknownCandidate(SessionId),

    /// The reconciler is not in a state that allows the call.
    #[error("operation not allowed while {0}")]
    InvalidState(&'static str),
}

impl ClientError {
    /// HTTP status of an error answer, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure says nothing about the session itself.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::WebSocket(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        let kind = match &err {
            ClientError::Api { status: 400, .. } => ErrorKind::InvalidRequest,
            ClientError::Api { status: 401, .. } => ErrorKind::Unauthorized,
            ClientError::Api { status: 403, .. } => ErrorKind::Forbidden,
            ClientError::Api { status: 404, .. } => ErrorKind::NotFound,
            ClientError::Api { status: 503, .. } | ClientError::Transport(_) => {
                ErrorKind::StoreUnavailable
            }
            ClientError::WebSocket(_) => ErrorKind::NotifierUnavailable,
            ClientError::UnknownCandidate(_) | ClientError::InvalidState(_) => {
                ErrorKind::InvalidRequest
            }
            _ => ErrorKind::Internal,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> ClientError {
        ClientError::Api {
            status,
            code: "X".into(),
            message: "m".into(),
        }
    }

    #[test]
    fn test_transient_classification() {
        assert!(api(503).is_transient());
        assert!(!api(403).is_transient());
        assert!(!ClientError::LimitStillReached.is_transient());
    }

    #[test]
    fn test_into_app_error_kind() {
        assert_eq!(AppError::from(api(403)).kind, ErrorKind::Forbidden);
        assert_eq!(AppError::from(api(401)).kind, ErrorKind::Unauthorized);
        assert_eq!(
            AppError::from(ClientError::InvalidState("terminated")).kind,
            ErrorKind::InvalidRequest
        );
    }
}
