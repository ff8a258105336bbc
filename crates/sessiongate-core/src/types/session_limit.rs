//! Concurrent-session cap.

use serde::{Deserialize, Serialize};

/// Maximum number of simultaneously active sessions for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionLimit {
    /// A fixed maximum number of concurrent sessions.
    Fixed(u32),
    /// No cap.
    Unlimited,
}

impl SessionLimit {
    /// Check whether a given active session count leaves no room for another.
    pub fn is_exceeded_by(&self, active_count: u32) -> bool {
        match self {
            Self::Fixed(max) => active_count >= *max,
            Self::Unlimited => false,
        }
    }
}

impl Default for SessionLimit {
    fn default() -> Self {
        Self::Fixed(2)
    }
}

impl From<u32> for SessionLimit {
    /// Convert a `u32` to a `SessionLimit`. `0` means unlimited.
    fn from(value: u32) -> Self {
        if value == 0 {
            Self::Unlimited
        } else {
            Self::Fixed(value)
        }
    }
}

impl std::fmt::Display for SessionLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(max) => write!(f, "{max}"),
            Self::Unlimited => write!(f, "unlimited"),
        }
    }
}
