//! Session limit resolution: the maximum concurrent sessions for an account.
//!
//! Resolution order:
//! 1. Per-account override (`session.overrides`)
//! 2. Default (`session.max_active_sessions`)

use sessiongate_core::config::SessionConfig;
use sessiongate_core::types::{AccountId, SessionLimit};

/// Resolves the concurrent-session cap for individual accounts.
#[derive(Debug, Clone)]
pub struct SessionLimiter {
    config: SessionConfig,
}

impl SessionLimiter {
    /// Creates a new session limiter.
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Resolves the effective cap for `account_id`. `0` anywhere means unlimited.
    pub fn resolve(&self, account_id: &AccountId) -> SessionLimit {
        match self.config.overrides.get(account_id.as_str()) {
            Some(max) => SessionLimit::from(*max),
            None => self.config.limit(),
        }
    }
}
