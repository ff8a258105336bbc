//! Results of session operations that are decisions rather than errors.

use serde::{Deserialize, Serialize};

use super::model::Session;

/// Result of an atomic registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// A new active row was written, or an inactive row was re-activated.
    Registered(Session),
    /// The session was already active; its metadata was refreshed.
    Refreshed(Session),
    /// The account is at its cap. Nothing was written.
    LimitReached {
        /// Current active sessions in login order.
        active: Vec<Session>,
    },
}

impl RegisterOutcome {
    /// Whether the session is active after the call.
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::LimitReached { .. })
    }
}

/// Answer of the liveness prober.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Liveness {
    /// The session is active.
    Active,
    /// The session logged out.
    Inactive,
    /// No such session, or it belongs to another account.
    NotFound,
}

impl Liveness {
    /// Whether the client holding this session must log out.
    pub fn requires_logout(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// Result of an eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictOutcome {
    /// The row was deleted.
    Evicted {
        /// Whether the eviction event reached the notifier.
        notified: bool,
    },
    /// There was nothing to delete; no event was published.
    AlreadyAbsent,
}

/// Result of an explicit logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// The row was flipped to inactive.
    LoggedOut,
    /// The row was already inactive, absent, or not the caller's.
    Unchanged,
}
