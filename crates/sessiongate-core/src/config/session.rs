//! Concurrent-session policy configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::session_limit::SessionLimit;

/// Concurrent-session policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum simultaneously active sessions per account. `0` means unlimited.
    #[serde(default = "default_max_active")]
    pub max_active_sessions: u32,
    /// Device label stored when none is supplied and none can be derived.
    #[serde(default = "default_device_info")]
    pub default_device_info: String,
    /// Maximum accepted length of a session identifier.
    #[serde(default = "default_max_session_id_len")]
    pub max_session_id_length: usize,
    /// Per-account caps keyed by account id; override `max_active_sessions`.
    #[serde(default)]
    pub overrides: HashMap<String, u32>,
}

impl SessionConfig {
    /// Returns the default cap as a [`SessionLimit`].
    pub fn limit(&self) -> SessionLimit {
        SessionLimit::from(self.max_active_sessions)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_active_sessions: default_max_active(),
            default_device_info: default_device_info(),
            max_session_id_length: default_max_session_id_len(),
            overrides: HashMap::new(),
        }
    }
}

fn default_max_active() -> u32 {
    2
}

fn default_device_info() -> String {
    "Unknown Device".to_string()
}

fn default_max_session_id_len() -> usize {
    255
}
