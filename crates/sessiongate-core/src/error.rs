//! Unified application error types for SessionGate.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. A refused registration is not an
//! error: it is reported through the registration outcome.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Malformed input. Rejected before any mutation.
    InvalidRequest,
    /// The bearer token is missing, malformed, or failed verification.
    Unauthorized,
    /// The caller is authenticated but does not own the target resource.
    Forbidden,
    /// The requested session or account does not exist.
    NotFound,
    /// The session store could not be reached or failed mid-operation.
    StoreUnavailable,
    /// The real-time notifier could not deliver an event.
    NotifierUnavailable,
    /// The identity provider's signing keys could not be fetched.
    IdentityProviderUnavailable,
    /// A configuration error occurred.
    Configuration,
    /// An internal server error occurred.
    Internal,
}

impl ErrorKind {
    /// Whether the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable | Self::NotifierUnavailable | Self::IdentityProviderUnavailable
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "INVALID_REQUEST"),
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::Forbidden => write!(f, "FORBIDDEN"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::StoreUnavailable => write!(f, "STORE_UNAVAILABLE"),
            Self::NotifierUnavailable => write!(f, "NOTIFIER_UNAVAILABLE"),
            Self::IdentityProviderUnavailable => write!(f, "IDENTITY_PROVIDER_UNAVAILABLE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout SessionGate.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid-request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a store-unavailable error.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StoreUnavailable, message)
    }

    /// Create a notifier-unavailable error.
    pub fn notifier_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotifierUnavailable, message)
    }

    /// Create an identity-provider-unavailable error.
    pub fn identity_provider_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IdentityProviderUnavailable, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Internal,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = AppError::forbidden("Session belongs to another account");
        assert_eq!(
            err.to_string(),
            "FORBIDDEN: Session belongs to another account"
        );
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(ErrorKind::StoreUnavailable.is_retryable());
        assert!(ErrorKind::NotifierUnavailable.is_retryable());
        assert!(ErrorKind::IdentityProviderUnavailable.is_retryable());
        assert!(!ErrorKind::Forbidden.is_retryable());
        assert!(!ErrorKind::InvalidRequest.is_retryable());
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::other("connection reset");
        let err = AppError::with_source(ErrorKind::StoreUnavailable, "store down", io);
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::StoreUnavailable);
        assert!(cloned.source.is_none());
    }
}
