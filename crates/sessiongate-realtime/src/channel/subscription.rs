//! Scoped subscription to one account channel.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, warn};

use crate::message::EventEnvelope;

use super::registry::ChannelMap;

/// A live subscription. Dropping it unsubscribes, and closes the channel
/// when it was the last subscriber.
#[derive(Debug)]
pub struct AccountSubscription {
    channel: String,
    receiver: broadcast::Receiver<EventEnvelope>,
    channels: Arc<ChannelMap>,
}

impl AccountSubscription {
    pub(crate) fn new(
        channel: String,
        receiver: broadcast::Receiver<EventEnvelope>,
        channels: Arc<ChannelMap>,
    ) -> Self {
        Self {
            channel,
            receiver,
            channels,
        }
    }

    /// The channel name.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the channel is closed. A subscriber that falls
    /// behind skips the overwritten events and keeps receiving.
    pub async fn recv(&mut self) -> Option<EventEnvelope> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) => return Some(envelope),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(channel = %self.channel, skipped, "Subscriber lagged, events dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take an already delivered event without waiting.
    pub fn try_recv(&mut self) -> Option<EventEnvelope> {
        loop {
            match self.receiver.try_recv() {
                Ok(envelope) => return Some(envelope),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for AccountSubscription {
    fn drop(&mut self) {
        // Our receiver is still counted here.
        let removed = self
            .channels
            .remove_if(&self.channel, |_, tx| tx.receiver_count() <= 1)
            .is_some();
        if removed {
            debug!(channel = %self.channel, "Closed channel after last subscriber left");
        }
    }
}
