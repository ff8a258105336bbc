//! [`SessionNotifier`] over the in-process channel registry.

use async_trait::async_trait;
use tracing::debug;

use sessiongate_core::config::RealtimeConfig;
use sessiongate_core::events::SessionEvent;
use sessiongate_core::result::AppResult;
use sessiongate_core::traits::SessionNotifier;
use sessiongate_core::types::AccountId;

use crate::channel::{AccountSubscription, ChannelRegistry};
use crate::message::EventEnvelope;

/// Publishes session events on `{channel_prefix}:{account_id}`.
#[derive(Debug, Clone)]
pub struct RealtimeNotifier {
    registry: ChannelRegistry,
    channel_prefix: String,
    event_name: String,
}

impl RealtimeNotifier {
    /// Creates a notifier over `registry`.
    pub fn new(registry: ChannelRegistry, config: &RealtimeConfig) -> Self {
        Self {
            registry,
            channel_prefix: config.channel_prefix.clone(),
            event_name: config.event_name.clone(),
        }
    }

    /// Channel name for an account.
    pub fn channel_name(&self, account_id: &AccountId) -> String {
        format!("{}:{}", self.channel_prefix, account_id)
    }

    /// Subscribe to an account's events. Release by dropping the guard.
    pub fn subscribe(&self, account_id: &AccountId) -> AccountSubscription {
        self.registry.subscribe(&self.channel_name(account_id))
    }
}

#[async_trait]
impl SessionNotifier for RealtimeNotifier {
    async fn publish(&self, account_id: &AccountId, event: SessionEvent) -> AppResult<usize> {
        let channel = self.channel_name(account_id);
        let envelope = EventEnvelope::from_event(&self.event_name, &event);
        let delivered = self.registry.publish(&channel, envelope);
        debug!(
            channel = %channel,
            session_id = %event.session_id(),
            delivered,
            "Published session event"
        );
        Ok(delivered)
    }

    fn subscriber_count(&self, account_id: &AccountId) -> usize {
        self.registry.subscriber_count(&self.channel_name(account_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sessiongate_core::types::SessionId;

    fn notifier() -> RealtimeNotifier {
        RealtimeNotifier::new(ChannelRegistry::new(16), &RealtimeConfig::default())
    }

    #[test]
    fn test_channel_naming() {
        let account = AccountId::parse("auth0|42").unwrap();
        assert_eq!(notifier().channel_name(&account), "user-updates:auth0|42");
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let notifier = notifier();
        let account = AccountId::parse("A").unwrap();
        let mut sub = notifier.subscribe(&account);
        assert_eq!(notifier.subscriber_count(&account), 1);

        let delivered = notifier
            .publish(&account, SessionEvent::terminated(SessionId::parse("S1").unwrap()))
            .await
            .unwrap();
        assert_eq!(delivered, 1);

        let envelope = sub.recv().await.unwrap();
        assert_eq!(envelope.event, "session-change");
        assert_eq!(envelope.terminated_session_id().unwrap().as_str(), "S1");
    }

    #[tokio::test]
    async fn test_publish_without_listeners_succeeds() {
        let notifier = notifier();
        let account = AccountId::parse("A").unwrap();
        let delivered = notifier
            .publish(&account, SessionEvent::terminated(SessionId::parse("S1").unwrap()))
            .await
            .unwrap();
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_dropped_subscription_is_released() {
        let notifier = notifier();
        let account = AccountId::parse("A").unwrap();
        {
            let _sub = notifier.subscribe(&account);
            assert_eq!(notifier.subscriber_count(&account), 1);
        }
        assert_eq!(notifier.subscriber_count(&account), 0);
    }
}
