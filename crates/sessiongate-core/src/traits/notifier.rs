//! Real-time notifier trait.

use async_trait::async_trait;

use crate::events::SessionEvent;
use crate::result::AppResult;
use crate::types::AccountId;

/// Fan-out of session events to the clients of one account.
///
/// Delivery is at-most-once per subscriber with no replay: a client that
/// subscribes after `publish` returns never sees the event. Publishing to
/// an account nobody is listening on succeeds.
#[async_trait]
pub trait SessionNotifier: Send + Sync + 'static {
    /// Publish `event` on the channel of `account_id`.
    ///
    /// Returns the number of subscribers the event was handed to.
    async fn publish(&self, account_id: &AccountId, event: SessionEvent) -> AppResult<usize>;

    /// Number of live subscribers for `account_id`.
    fn subscriber_count(&self, account_id: &AccountId) -> usize;
}
