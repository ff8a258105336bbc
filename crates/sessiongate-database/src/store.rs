//! The session store abstraction.

use async_trait::async_trait;

use sessiongate_core::result::AppResult;
use sessiongate_core::types::{AccountId, SessionId, SessionLimit};
use sessiongate_entity::session::{NewSession, RegisterOutcome, Session, SessionStatus};

/// Durable mapping `session_id -> Session`, queryable by account.
///
/// Every implementation must make [`register_within_limit`] atomic per
/// account: two concurrent calls for the same account may never both
/// observe room under the cap and both insert.
///
/// [`register_within_limit`]: SessionStore::register_within_limit
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Active sessions of `account_id` in login order.
    async fn list_active(&self, account_id: &AccountId) -> AppResult<Vec<Session>>;

    /// Look up a session regardless of status or owner.
    async fn get(&self, session_id: &SessionId) -> AppResult<Option<Session>>;

    /// Write `session` keyed by its id, replacing any existing row.
    async fn upsert(&self, session: &Session) -> AppResult<()>;

    /// Remove a row outright. Returns whether a row existed.
    async fn delete(&self, session_id: &SessionId) -> AppResult<bool>;

    /// Remove a row only if `account_id` owns it. Returns whether a row was removed.
    async fn delete_owned(&self, account_id: &AccountId, session_id: &SessionId)
    -> AppResult<bool>;

    /// Number of active sessions of `account_id`.
    async fn count_active(&self, account_id: &AccountId) -> AppResult<u32>;

    /// Change the status of a row owned by `account_id`.
    ///
    /// Returns whether a row changed.
    async fn set_status(
        &self,
        account_id: &AccountId,
        session_id: &SessionId,
        status: SessionStatus,
    ) -> AppResult<bool>;

    /// Check that the backing store answers.
    async fn ping(&self) -> AppResult<()>;

    /// Atomic count-then-insert.
    ///
    /// - An already active row of the same account is refreshed in place.
    /// - An active row owned by another account is `Forbidden`.
    /// - Otherwise the row is inserted (or an inactive row re-activated with
    ///   a fresh login time) when the account is under `limit`.
    /// - At the cap nothing is written and the current actives are returned.
    async fn register_within_limit(
        &self,
        new: NewSession,
        limit: SessionLimit,
    ) -> AppResult<RegisterOutcome>;
}
