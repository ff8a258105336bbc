//! Channel registry: account channel name to broadcast sender.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;

use crate::message::EventEnvelope;

use super::subscription::AccountSubscription;

pub(crate) type ChannelMap = DashMap<String, broadcast::Sender<EventEnvelope>>;

/// Registry of live account channels.
///
/// A channel exists only while it has at least one subscriber; the last
/// [`AccountSubscription`] to drop removes it.
#[derive(Debug, Clone)]
pub struct ChannelRegistry {
    channels: Arc<ChannelMap>,
    buffer_size: usize,
}

impl ChannelRegistry {
    /// Creates a new channel registry.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
            buffer_size: buffer_size.max(1),
        }
    }

    /// Subscribe to `channel_name`, creating the channel on first use.
    pub fn subscribe(&self, channel_name: &str) -> AccountSubscription {
        let receiver = self
            .channels
            .entry(channel_name.to_string())
            .or_insert_with(|| {
                debug!(channel = %channel_name, "Opening channel");
                broadcast::channel(self.buffer_size).0
            })
            .subscribe();
        AccountSubscription::new(channel_name.to_string(), receiver, self.channels.clone())
    }

    /// Deliver `envelope` to every current subscriber of `channel_name`.
    ///
    /// Returns the number of receivers reached; zero when nobody listens.
    pub fn publish(&self, channel_name: &str, envelope: EventEnvelope) -> usize {
        match self.channels.get(channel_name) {
            Some(sender) => sender.send(envelope).unwrap_or(0),
            None => 0,
        }
    }

    /// Returns subscriber count for a channel.
    pub fn subscriber_count(&self, channel_name: &str) -> usize {
        self.channels
            .get(channel_name)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    /// Returns total number of open channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(id: &str) -> EventEnvelope {
        EventEnvelope {
            event: "session-change".to_string(),
            payload: serde_json::json!({ "terminated_session_id": id }),
        }
    }

    #[tokio::test]
    async fn test_fan_out_to_all_subscribers() {
        let registry = ChannelRegistry::new(8);
        let mut a = registry.subscribe("user-updates:A");
        let mut b = registry.subscribe("user-updates:A");

        assert_eq!(registry.publish("user-updates:A", envelope("S1")), 2);
        assert_eq!(a.recv().await.unwrap(), envelope("S1"));
        assert_eq!(b.recv().await.unwrap(), envelope("S1"));
    }

    #[tokio::test]
    async fn test_channels_are_isolated_per_account() {
        let registry = ChannelRegistry::new(8);
        let mut a = registry.subscribe("user-updates:A");
        let _b = registry.subscribe("user-updates:B");

        assert_eq!(registry.publish("user-updates:B", envelope("S2")), 1);
        assert!(a.try_recv().is_none());
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let registry = ChannelRegistry::new(8);
        assert_eq!(registry.publish("user-updates:nobody", envelope("S1")), 0);
        assert_eq!(registry.channel_count(), 0);
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let registry = ChannelRegistry::new(8);
        let _early = registry.subscribe("user-updates:A");
        registry.publish("user-updates:A", envelope("S1"));

        let mut late = registry.subscribe("user-updates:A");
        assert!(late.try_recv().is_none());
    }

    #[test]
    fn test_last_drop_removes_channel() {
        let registry = ChannelRegistry::new(8);
        let first = registry.subscribe("user-updates:A");
        let second = registry.subscribe("user-updates:A");
        assert_eq!(registry.subscriber_count("user-updates:A"), 2);

        drop(first);
        assert_eq!(registry.channel_count(), 1);
        assert_eq!(registry.subscriber_count("user-updates:A"), 1);

        drop(second);
        assert_eq!(registry.channel_count(), 0);
    }
}
