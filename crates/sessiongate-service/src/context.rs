//! Request context carrying the verified account and request origin.

use chrono::{DateTime, Utc};
use serde::Serialize;

use sessiongate_core::types::AccountId;

/// Context for the current authenticated request.
///
/// Built by the HTTP layer after token verification; the account id is
/// never taken from request bodies.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    /// The verified account.
    pub account_id: AccountId,
    /// IP address of the request origin.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(account_id: AccountId, ip_address: String, user_agent: Option<String>) -> Self {
        Self {
            account_id,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }
}
