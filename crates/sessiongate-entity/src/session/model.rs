//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use sessiongate_core::types::{AccountId, SessionId};

use super::status::SessionStatus;

/// One authenticated browser login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Provider-issued session identifier (`sid`), unique across accounts.
    #[sqlx(try_from = "String")]
    pub session_id: SessionId,
    /// The owning account.
    #[sqlx(try_from = "String")]
    pub account_id: AccountId,
    /// Browser and OS description. Display only.
    pub device_info: String,
    /// Network origin at registration time.
    pub ip_address: String,
    /// When the session was first registered. Never rewritten while active.
    pub logged_in_at: DateTime<Utc>,
    /// Current status.
    pub status: SessionStatus,
}

impl Session {
    /// Whether this session counts against the account's cap.
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Whether `account_id` owns this session.
    pub fn is_owned_by(&self, account_id: &AccountId) -> bool {
        &self.account_id == account_id
    }
}

/// Data required to register a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSession {
    /// Provider-issued session identifier.
    pub session_id: SessionId,
    /// Owning account, taken from the verified token.
    pub account_id: AccountId,
    /// Browser and OS description.
    pub device_info: String,
    /// Caller's network origin.
    pub ip_address: String,
}

impl NewSession {
    /// Materialize an active row logged in at `now`.
    pub fn into_session(self, now: DateTime<Utc>) -> Session {
        Session {
            session_id: self.session_id,
            account_id: self.account_id,
            device_info: self.device_info,
            ip_address: self.ip_address,
            logged_in_at: now,
            status: SessionStatus::Active,
        }
    }

    /// Copy the refreshable metadata onto an existing active row.
    ///
    /// `logged_in_at` and `status` are left alone.
    pub fn refresh(&self, existing: &mut Session) {
        existing.device_info = self.device_info.clone();
        existing.ip_address = self.ip_address.clone();
    }
}
