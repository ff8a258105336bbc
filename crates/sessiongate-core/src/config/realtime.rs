//! Real-time fan-out configuration.

use serde::{Deserialize, Serialize};

/// Real-time (per-account broadcast) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Buffer size of each per-account broadcast channel.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Channel name prefix; the account id is appended after a colon.
    #[serde(default = "default_channel_prefix")]
    pub channel_prefix: String,
    /// Event name carried by eviction messages.
    #[serde(default = "default_event_name")]
    pub event_name: String,
    /// WebSocket ping interval in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Upper bound on a single publish, in seconds.
    #[serde(default = "default_publish_timeout")]
    pub publish_timeout_seconds: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            channel_prefix: default_channel_prefix(),
            event_name: default_event_name(),
            ping_interval_seconds: default_ping_interval(),
            publish_timeout_seconds: default_publish_timeout(),
        }
    }
}

fn default_channel_buffer() -> usize {
    64
}

fn default_channel_prefix() -> String {
    "user-updates".to_string()
}

fn default_event_name() -> String {
    "session-change".to_string()
}

fn default_ping_interval() -> u64 {
    30
}

fn default_publish_timeout() -> u64 {
    5
}
