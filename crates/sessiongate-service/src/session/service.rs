//! Registration, listing, liveness and explicit logout.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use sessiongate_auth::limiter::SessionLimiter;
use sessiongate_core::config::SessionConfig;
use sessiongate_core::error::AppError;
use sessiongate_core::types::SessionId;
use sessiongate_database::store::SessionStore;
use sessiongate_entity::session::{
    Liveness, LogoutOutcome, NewSession, RegisterOutcome, Session, SessionStatus,
};

use crate::context::RequestContext;

use super::device::resolve_device_info;

/// Input of a registration, as sent by the client after login.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// Provider-issued session id of the calling browser.
    pub session_id: String,
    /// Client-derived device label.
    #[serde(default)]
    pub device_info: Option<String>,
}

/// The session registrar, liveness prober and logout handler.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    limiter: SessionLimiter,
    config: SessionConfig,
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("limiter", &self.limiter)
            .finish()
    }
}

impl SessionService {
    /// Creates a new session service.
    pub fn new(store: Arc<dyn SessionStore>, config: SessionConfig) -> Self {
        Self {
            store,
            limiter: SessionLimiter::new(config.clone()),
            config,
        }
    }

    /// Validate a client-supplied session id.
    pub fn parse_session_id(&self, raw: &str) -> Result<SessionId, AppError> {
        let session_id = SessionId::parse(raw)?;
        if session_id.len() > self.config.max_session_id_length {
            return Err(AppError::invalid_request(format!(
                "session_id exceeds {} bytes",
                self.config.max_session_id_length
            )));
        }
        Ok(session_id)
    }

    /// Register the caller's session under the account's cap.
    ///
    /// At the cap the store is left untouched and the current active
    /// sessions come back as eviction candidates.
    pub async fn register(
        &self,
        ctx: &RequestContext,
        req: RegisterRequest,
    ) -> Result<RegisterOutcome, AppError> {
        let session_id = self.parse_session_id(&req.session_id)?;
        let device_info = resolve_device_info(
            req.device_info.as_deref(),
            ctx.user_agent.as_deref(),
            &self.config.default_device_info,
        );
        let limit = self.limiter.resolve(&ctx.account_id);

        let new = NewSession {
            session_id,
            account_id: ctx.account_id.clone(),
            device_info,
            ip_address: ctx.ip_address.clone(),
        };
        let session_id = new.session_id.clone();

        let outcome = self.store.register_within_limit(new, limit).await?;

        match &outcome {
            RegisterOutcome::Registered(session) => info!(
                account_id = %ctx.account_id,
                session_id = %session_id,
                device = %session.device_info,
                limit = %limit,
                "Session registered"
            ),
            RegisterOutcome::Refreshed(_) => debug!(
                account_id = %ctx.account_id,
                session_id = %session_id,
                "Session re-registered"
            ),
            RegisterOutcome::LimitReached { active } => warn!(
                account_id = %ctx.account_id,
                session_id = %session_id,
                active = active.len(),
                limit = %limit,
                "Session limit reached"
            ),
        }

        Ok(outcome)
    }

    /// Whether the session store currently answers.
    pub async fn store_available(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Session store unavailable");
                false
            }
        }
    }

    /// Active sessions of the caller's account in login order.
    pub async fn list_active(&self, ctx: &RequestContext) -> Result<Vec<Session>, AppError> {
        self.store.list_active(&ctx.account_id).await
    }

    /// Liveness of one of the caller's sessions.
    ///
    /// Sessions of other accounts answer `NotFound`.
    pub async fn status(
        &self,
        ctx: &RequestContext,
        session_id: &SessionId,
    ) -> Result<Liveness, AppError> {
        let liveness = match self.store.get(session_id).await? {
            Some(s) if s.is_owned_by(&ctx.account_id) => match s.status {
                SessionStatus::Active => Liveness::Active,
                SessionStatus::Inactive => Liveness::Inactive,
            },
            _ => Liveness::NotFound,
        };
        Ok(liveness)
    }

    /// Flip the caller's session to inactive, keeping the row.
    ///
    /// Unknown, foreign or already inactive sessions are acknowledged
    /// without change.
    pub async fn logout(
        &self,
        ctx: &RequestContext,
        session_id: &SessionId,
    ) -> Result<LogoutOutcome, AppError> {
        let changed = self
            .store
            .set_status(&ctx.account_id, session_id, SessionStatus::Inactive)
            .await?;

        if changed {
            info!(account_id = %ctx.account_id, session_id = %session_id, "Session logged out");
            Ok(LogoutOutcome::LoggedOut)
        } else {
            debug!(
                account_id = %ctx.account_id,
                session_id = %session_id,
                "Logout for unknown or inactive session"
            );
            Ok(LogoutOutcome::Unchanged)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sessiongate_core::error::ErrorKind;
    use sessiongate_core::types::AccountId;
    use sessiongate_database::MemorySessionStore;

    fn ctx(account: &str) -> RequestContext {
        RequestContext::new(
            AccountId::parse(account).unwrap(),
            "203.0.113.10".to_string(),
            Some("Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0".into()),
        )
    }

    fn req(session_id: &str) -> RegisterRequest {
        RegisterRequest {
            session_id: session_id.to_string(),
            device_info: None,
        }
    }

    fn sid(id: &str) -> SessionId {
        SessionId::parse(id).unwrap()
    }

    fn service() -> SessionService {
        SessionService::new(Arc::new(MemorySessionStore::new()), SessionConfig::default())
    }

    #[tokio::test]
    async fn test_memory_store_is_available() {
        assert!(service().store_available().await);
    }

    #[tokio::test]
    async fn test_register_derives_device_and_ip() {
        let service = service();
        let outcome = service.register(&ctx("A"), req("S1")).await.unwrap();
        let RegisterOutcome::Registered(session) = outcome else {
            panic!("expected Registered");
        };
        assert_eq!(session.device_info, "Firefox 128.0 on Linux");
        assert_eq!(session.ip_address, "203.0.113.10");
    }

    #[tokio::test]
    async fn test_limit_reached_returns_candidates_in_order() {
        let service = service();
        let a = ctx("A");
        service.register(&a, req("S1")).await.unwrap();
        service.register(&a, req("S2")).await.unwrap();

        match service.register(&a, req("S3")).await.unwrap() {
            RegisterOutcome::LimitReached { active } => {
                let ids: Vec<_> = active.iter().map(|s| s.session_id.as_str()).collect();
                assert_eq!(ids, ["S1", "S2"]);
            }
            other => panic!("expected LimitReached, got {other:?}"),
        }
        assert_eq!(service.list_active(&a).await.unwrap().len(), 2);
        assert_eq!(service.status(&a, &sid("S3")).await.unwrap(), Liveness::NotFound);
    }

    #[tokio::test]
    async fn test_invalid_session_ids() {
        let service = service();
        let err = service.register(&ctx("A"), req("  ")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidRequest);

        let long = "x".repeat(256);
        let err = service.register(&ctx("A"), req(&long)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn test_status_hides_other_accounts() {
        let service = service();
        service.register(&ctx("A"), req("S1")).await.unwrap();

        assert_eq!(service.status(&ctx("A"), &sid("S1")).await.unwrap(), Liveness::Active);
        assert_eq!(service.status(&ctx("B"), &sid("S1")).await.unwrap(), Liveness::NotFound);
    }

    #[tokio::test]
    async fn test_logout_is_soft_and_scoped() {
        let service = service();
        let a = ctx("A");
        service.register(&a, req("S1")).await.unwrap();

        assert_eq!(
            service.logout(&ctx("B"), &sid("S1")).await.unwrap(),
            LogoutOutcome::Unchanged
        );
        assert_eq!(service.logout(&a, &sid("S1")).await.unwrap(), LogoutOutcome::LoggedOut);
        assert_eq!(service.logout(&a, &sid("S1")).await.unwrap(), LogoutOutcome::Unchanged);
        assert_eq!(service.status(&a, &sid("S1")).await.unwrap(), Liveness::Inactive);
        assert!(service.list_active(&a).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_override_limit_applies() {
        let mut config = SessionConfig::default();
        config.overrides.insert("solo".to_string(), 1);
        let service = SessionService::new(Arc::new(MemorySessionStore::new()), config);
        let solo = ctx("solo");

        service.register(&solo, req("S1")).await.unwrap();
        let outcome = service.register(&solo, req("S2")).await.unwrap();
        assert!(!outcome.is_accepted());
    }
}
