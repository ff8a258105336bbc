//! Eviction of one of the caller's sessions by another.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use sessiongate_core::error::AppError;
use sessiongate_core::events::SessionEvent;
use sessiongate_core::traits::SessionNotifier;
use sessiongate_core::types::SessionId;
use sessiongate_database::store::SessionStore;
use sessiongate_entity::session::EvictOutcome;

use crate::context::RequestContext;

/// Deletes a session outright and tells the evicted browser.
#[derive(Clone)]
pub struct EvictionService {
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn SessionNotifier>,
    publish_timeout: Duration,
}

impl std::fmt::Debug for EvictionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvictionService")
            .field("publish_timeout", &self.publish_timeout)
            .finish()
    }
}

impl EvictionService {
    /// Creates a new eviction service.
    pub fn new(
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn SessionNotifier>,
        publish_timeout: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            publish_timeout,
        }
    }

    /// Evict `session_id` on behalf of the caller.
    ///
    /// The row is deleted before the event is published. An absent session
    /// is a success without an event; a session of another account is
    /// `Forbidden` and left untouched. A failed or slow publish does not undo
    /// the deletion: it is reported as `notified: false`.
    pub async fn evict(
        &self,
        ctx: &RequestContext,
        session_id: &SessionId,
    ) -> Result<EvictOutcome, AppError> {
        let Some(existing) = self.store.get(session_id).await? else {
            info!(account_id = %ctx.account_id, session_id = %session_id, "Evict: already absent");
            return Ok(EvictOutcome::AlreadyAbsent);
        };

        if !existing.is_owned_by(&ctx.account_id) {
            warn!(
                account_id = %ctx.account_id,
                session_id = %session_id,
                "Evict refused: session belongs to another account"
            );
            return Err(AppError::forbidden(
                "Cannot evict a session of another account",
            ));
        }

        if !self.store.delete_owned(&ctx.account_id, session_id).await? {
            return Ok(EvictOutcome::AlreadyAbsent);
        }

        let event = SessionEvent::terminated(session_id.clone());
        let notified =
            match tokio::time::timeout(self.publish_timeout, self.notifier.publish(&ctx.account_id, event))
                .await
            {
                Ok(Ok(delivered)) => {
                    info!(
                        account_id = %ctx.account_id,
                        session_id = %session_id,
                        delivered,
                        "Session evicted"
                    );
                    true
                }
                Ok(Err(e)) => {
                    warn!(
                        account_id = %ctx.account_id,
                        session_id = %session_id,
                        error = %e,
                        "Session evicted but notification failed"
                    );
                    false
                }
                Err(_) => {
                    warn!(
                        account_id = %ctx.account_id,
                        session_id = %session_id,
                        timeout_ms = self.publish_timeout.as_millis() as u64,
                        "Session evicted but notification timed out"
                    );
                    false
                }
            };

        Ok(EvictOutcome::Evicted { notified })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sessiongate_core::config::RealtimeConfig;
    use sessiongate_core::error::ErrorKind;
    use sessiongate_core::result::AppResult;
    use sessiongate_core::types::{AccountId, SessionLimit};
    use sessiongate_database::MemorySessionStore;
    use sessiongate_entity::session::NewSession;
    use sessiongate_realtime::{ChannelRegistry, RealtimeNotifier};

    struct FailingNotifier;

    #[async_trait]
    impl SessionNotifier for FailingNotifier {
        async fn publish(&self, _: &AccountId, _: SessionEvent) -> AppResult<usize> {
            Err(AppError::notifier_unavailable("broker down"))
        }

        fn subscriber_count(&self, _: &AccountId) -> usize {
            0
        }
    }

    struct StalledNotifier;

    #[async_trait]
    impl SessionNotifier for StalledNotifier {
        async fn publish(&self, _: &AccountId, _: SessionEvent) -> AppResult<usize> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(0)
        }

        fn subscriber_count(&self, _: &AccountId) -> usize {
            0
        }
    }

    fn ctx(account: &str) -> RequestContext {
        RequestContext::new(AccountId::parse(account).unwrap(), "127.0.0.1".into(), None)
    }

    fn sid(id: &str) -> SessionId {
        SessionId::parse(id).unwrap()
    }

    async fn seeded_store() -> Arc<MemorySessionStore> {
        let store = Arc::new(MemorySessionStore::new());
        for (account, id) in [("A", "S1"), ("A", "S2"), ("B", "T1")] {
            store
                .register_within_limit(
                    NewSession {
                        session_id: sid(id),
                        account_id: AccountId::parse(account).unwrap(),
                        device_info: "test".into(),
                        ip_address: "127.0.0.1".into(),
                    },
                    SessionLimit::Fixed(2),
                )
                .await
                .unwrap();
        }
        store
    }

    fn realtime() -> Arc<RealtimeNotifier> {
        Arc::new(RealtimeNotifier::new(
            ChannelRegistry::new(8),
            &RealtimeConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_evict_deletes_and_publishes() {
        let store = seeded_store().await;
        let notifier = realtime();
        let mut sub = notifier.subscribe(&AccountId::parse("A").unwrap());
        let service = EvictionService::new(store.clone(), notifier, Duration::from_secs(5));

        let outcome = service.evict(&ctx("A"), &sid("S1")).await.unwrap();

        assert_eq!(outcome, EvictOutcome::Evicted { notified: true });
        assert!(store.get(&sid("S1")).await.unwrap().is_none());
        let envelope = sub.recv().await.unwrap();
        assert_eq!(envelope.terminated_session_id().unwrap(), sid("S1"));
    }

    #[tokio::test]
    async fn test_evict_absent_does_not_publish() {
        let store = seeded_store().await;
        let notifier = realtime();
        let mut sub = notifier.subscribe(&AccountId::parse("A").unwrap());
        let service = EvictionService::new(store, notifier, Duration::from_secs(5));

        let outcome = service.evict(&ctx("A"), &sid("gone")).await.unwrap();

        assert_eq!(outcome, EvictOutcome::AlreadyAbsent);
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_evict_foreign_session_is_forbidden() {
        let store = seeded_store().await;
        let service = EvictionService::new(store.clone(), realtime(), Duration::from_secs(5));

        let err = service.evict(&ctx("A"), &sid("T1")).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Forbidden);
        assert!(store.get(&sid("T1")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_notifier_failure_keeps_deletion() {
        let store = seeded_store().await;
        let service =
            EvictionService::new(store.clone(), Arc::new(FailingNotifier), Duration::from_secs(5));

        let outcome = service.evict(&ctx("A"), &sid("S2")).await.unwrap();

        assert_eq!(outcome, EvictOutcome::Evicted { notified: false });
        assert!(store.get(&sid("S2")).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_notifier_times_out() {
        let store = seeded_store().await;
        let service =
            EvictionService::new(store.clone(), Arc::new(StalledNotifier), Duration::from_secs(5));

        let outcome = service.evict(&ctx("A"), &sid("S1")).await.unwrap();

        assert_eq!(outcome, EvictOutcome::Evicted { notified: false });
    }
}
