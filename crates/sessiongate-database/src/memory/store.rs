//! In-memory session store using a Tokio mutex for single-node deployments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use sessiongate_core::error::AppError;
use sessiongate_core::result::AppResult;
use sessiongate_core::types::{AccountId, SessionId, SessionLimit};
use sessiongate_entity::session::{NewSession, RegisterOutcome, Session, SessionStatus};

use crate::store::SessionStore;

#[derive(Debug)]
struct Entry {
    /// Insertion sequence, breaks `logged_in_at` ties.
    seq: u64,
    session: Session,
}

#[derive(Debug, Default)]
struct InnerState {
    sessions: HashMap<SessionId, Entry>,
    next_seq: u64,
}

impl InnerState {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn active_for(&self, account_id: &AccountId) -> Vec<Session> {
        let mut entries: Vec<&Entry> = self
            .sessions
            .values()
            .filter(|e| e.session.is_active() && e.session.is_owned_by(account_id))
            .collect();
        entries.sort_by_key(|e| (e.session.logged_in_at, e.seq));
        entries.into_iter().map(|e| e.session.clone()).collect()
    }

    fn count_for(&self, account_id: &AccountId) -> u32 {
        let count = self
            .sessions
            .values()
            .filter(|e| e.session.is_active() && e.session.is_owned_by(account_id))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

/// In-memory session store.
///
/// A single mutex guards the whole map, so every registration is trivially
/// serialized. Suitable for tests and single-node development; state is
/// lost on restart.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows of any status.
    pub async fn len(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    /// Whether the store holds no rows.
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn list_active(&self, account_id: &AccountId) -> AppResult<Vec<Session>> {
        Ok(self.state.lock().await.active_for(account_id))
    }

    async fn get(&self, session_id: &SessionId) -> AppResult<Option<Session>> {
        let state = self.state.lock().await;
        Ok(state.sessions.get(session_id).map(|e| e.session.clone()))
    }

    async fn upsert(&self, session: &Session) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let seq = match state.sessions.get(&session.session_id) {
            Some(entry) => entry.seq,
            None => state.next_seq(),
        };
        state.sessions.insert(
            session.session_id.clone(),
            Entry {
                seq,
                session: session.clone(),
            },
        );
        Ok(())
    }

    async fn delete(&self, session_id: &SessionId) -> AppResult<bool> {
        Ok(self.state.lock().await.sessions.remove(session_id).is_some())
    }

    async fn delete_owned(
        &self,
        account_id: &AccountId,
        session_id: &SessionId,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let owned = state
            .sessions
            .get(session_id)
            .is_some_and(|e| e.session.is_owned_by(account_id));
        if owned {
            state.sessions.remove(session_id);
        }
        Ok(owned)
    }

    async fn count_active(&self, account_id: &AccountId) -> AppResult<u32> {
        Ok(self.state.lock().await.count_for(account_id))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn set_status(
        &self,
        account_id: &AccountId,
        session_id: &SessionId,
        status: SessionStatus,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.sessions.get_mut(session_id) {
            Some(entry)
                if entry.session.is_owned_by(account_id) && entry.session.status != status =>
            {
                entry.session.status = status;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn register_within_limit(
        &self,
        new: NewSession,
        limit: SessionLimit,
    ) -> AppResult<RegisterOutcome> {
        let mut state = self.state.lock().await;

        if let Some(entry) = state.sessions.get_mut(&new.session_id) {
            if entry.session.is_active() {
                if !entry.session.is_owned_by(&new.account_id) {
                    return Err(AppError::forbidden("Session is active for another account"));
                }
                new.refresh(&mut entry.session);
                debug!(session_id = %new.session_id, "Refreshed active session");
                return Ok(RegisterOutcome::Refreshed(entry.session.clone()));
            }
        }

        let active = state.count_for(&new.account_id);
        if limit.is_exceeded_by(active) {
            return Ok(RegisterOutcome::LimitReached {
                active: state.active_for(&new.account_id),
            });
        }

        let seq = state.next_seq();
        let session = new.into_session(Utc::now());
        state.sessions.insert(
            session.session_id.clone(),
            Entry {
                seq,
                session: session.clone(),
            },
        );
        debug!(
            account_id = %session.account_id,
            session_id = %session.session_id,
            active = active + 1,
            "Inserted session"
        );
        Ok(RegisterOutcome::Registered(session))
    }
}
