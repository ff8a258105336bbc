//! PostgreSQL session store.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use sessiongate_core::error::{AppError, ErrorKind};
use sessiongate_core::result::AppResult;
use sessiongate_core::types::{AccountId, SessionId, SessionLimit};
use sessiongate_entity::session::{NewSession, RegisterOutcome, Session, SessionStatus};

use crate::store::SessionStore;

const SELECT_ACTIVE_BY_ACCOUNT: &str = "SELECT * FROM active_sessions \
     WHERE account_id = $1 AND status = 'active' \
     ORDER BY logged_in_at ASC, session_id ASC";

const COUNT_ACTIVE_BY_ACCOUNT: &str =
    "SELECT COUNT(*) FROM active_sessions WHERE account_id = $1 AND status = 'active'";

fn store_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::StoreUnavailable, context, e)
}

fn count_to_u32(count: i64) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Session store over the `active_sessions` table.
///
/// Registration serializes per account with a transaction-scoped advisory
/// lock keyed on `hashtext(account_id)`, so the guarantee holds across
/// every process sharing the database.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Create a new store over `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lock_account(
        tx: &mut Transaction<'_, Postgres>,
        account_id: &AccountId,
    ) -> AppResult<()> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(account_id.as_str())
            .execute(&mut **tx)
            .await
            .map_err(store_error("Failed to lock account"))?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn list_active(&self, account_id: &AccountId) -> AppResult<Vec<Session>> {
        sqlx::query_as::<_, Session>(SELECT_ACTIVE_BY_ACCOUNT)
            .bind(account_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(store_error("Failed to list active sessions"))
    }

    async fn get(&self, session_id: &SessionId) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM active_sessions WHERE session_id = $1")
            .bind(session_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error("Failed to find session"))
    }

    async fn upsert(&self, session: &Session) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO active_sessions \
             (session_id, account_id, device_info, ip_address, logged_in_at, status) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (session_id) DO UPDATE SET \
             account_id = EXCLUDED.account_id, device_info = EXCLUDED.device_info, \
             ip_address = EXCLUDED.ip_address, logged_in_at = EXCLUDED.logged_in_at, \
             status = EXCLUDED.status",
        )
        .bind(session.session_id.as_str())
        .bind(session.account_id.as_str())
        .bind(&session.device_info)
        .bind(&session.ip_address)
        .bind(session.logged_in_at)
        .bind(session.status)
        .execute(&self.pool)
        .await
        .map_err(store_error("Failed to upsert session"))?;
        Ok(())
    }

    async fn delete(&self, session_id: &SessionId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM active_sessions WHERE session_id = $1")
            .bind(session_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(store_error("Failed to delete session"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_owned(
        &self,
        account_id: &AccountId,
        session_id: &SessionId,
    ) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM active_sessions WHERE session_id = $1 AND account_id = $2")
                .bind(session_id.as_str())
                .bind(account_id.as_str())
                .execute(&self.pool)
                .await
                .map_err(store_error("Failed to delete session"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_active(&self, account_id: &AccountId) -> AppResult<u32> {
        let count: i64 = sqlx::query_scalar(COUNT_ACTIVE_BY_ACCOUNT)
            .bind(account_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(store_error("Failed to count active sessions"))?;
        Ok(count_to_u32(count))
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(store_error("Health check failed"))?;
        Ok(())
    }

    async fn set_status(
        &self,
        account_id: &AccountId,
        session_id: &SessionId,
        status: SessionStatus,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE active_sessions SET status = $3 \
             WHERE session_id = $1 AND account_id = $2 AND status <> $3",
        )
        .bind(session_id.as_str())
        .bind(account_id.as_str())
        .bind(status)
        .execute(&self.pool)
        .await
        .map_err(store_error("Failed to update session status"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn register_within_limit(
        &self,
        new: NewSession,
        limit: SessionLimit,
    ) -> AppResult<RegisterOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(store_error("Failed to begin transaction"))?;

        Self::lock_account(&mut tx, &new.account_id).await?;

        let existing = sqlx::query_as::<_, Session>(
            "SELECT * FROM active_sessions WHERE session_id = $1 FOR UPDATE",
        )
        .bind(new.session_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_error("Failed to find session"))?;

        if let Some(existing) = existing.filter(Session::is_active) {
            if !existing.is_owned_by(&new.account_id) {
                return Err(AppError::forbidden(
                    "Session is active for another account",
                ));
            }
            let refreshed = sqlx::query_as::<_, Session>(
                "UPDATE active_sessions SET device_info = $2, ip_address = $3 \
                 WHERE session_id = $1 RETURNING *",
            )
            .bind(new.session_id.as_str())
            .bind(&new.device_info)
            .bind(&new.ip_address)
            .fetch_one(&mut *tx)
            .await
            .map_err(store_error("Failed to refresh session"))?;
            tx.commit()
                .await
                .map_err(store_error("Failed to commit transaction"))?;
            debug!(session_id = %refreshed.session_id, "Refreshed active session");
            return Ok(RegisterOutcome::Refreshed(refreshed));
        }

        let count: i64 = sqlx::query_scalar(COUNT_ACTIVE_BY_ACCOUNT)
            .bind(new.account_id.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(store_error("Failed to count active sessions"))?;

        if limit.is_exceeded_by(count_to_u32(count)) {
            let active = sqlx::query_as::<_, Session>(SELECT_ACTIVE_BY_ACCOUNT)
                .bind(new.account_id.as_str())
                .fetch_all(&mut *tx)
                .await
                .map_err(store_error("Failed to list active sessions"))?;
            tx.rollback()
                .await
                .map_err(store_error("Failed to roll back transaction"))?;
            return Ok(RegisterOutcome::LimitReached { active });
        }

        // A concurrent registration of the same id by another account is not
        // covered by our account lock; the conflict guard catches it.
        let inserted = sqlx::query_as::<_, Session>(
            "INSERT INTO active_sessions \
             (session_id, account_id, device_info, ip_address, logged_in_at, status) \
             VALUES ($1, $2, $3, $4, NOW(), 'active') \
             ON CONFLICT (session_id) DO UPDATE SET \
             account_id = EXCLUDED.account_id, device_info = EXCLUDED.device_info, \
             ip_address = EXCLUDED.ip_address, logged_in_at = EXCLUDED.logged_in_at, \
             status = 'active' \
             WHERE active_sessions.status = 'inactive' \
             RETURNING *",
        )
        .bind(new.session_id.as_str())
        .bind(new.account_id.as_str())
        .bind(&new.device_info)
        .bind(&new.ip_address)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_error("Failed to insert session"))?;

        let Some(session) = inserted else {
            return Err(AppError::forbidden(
                "Session is active for another account",
            ));
        };

        tx.commit()
            .await
            .map_err(store_error("Failed to commit transaction"))?;

        debug!(
            account_id = %session.account_id,
            session_id = %session.session_id,
            active = count + 1,
            "Inserted session"
        );
        Ok(RegisterOutcome::Registered(session))
    }
}
