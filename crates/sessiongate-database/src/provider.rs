//! Store selection from configuration.

use std::sync::Arc;

use tracing::info;

use sessiongate_core::config::{DatabaseConfig, StoreProvider};
use sessiongate_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::MemorySessionStore;
use crate::migration::run_migrations;
use crate::repositories::PgSessionStore;
use crate::store::SessionStore;

/// Build the configured session store.
///
/// For PostgreSQL this connects the pool and, when enabled, applies
/// pending migrations before returning.
pub async fn connect_store(config: &DatabaseConfig) -> AppResult<Arc<dyn SessionStore>> {
    match config.provider {
        StoreProvider::Postgres => {
            let db = DatabasePool::connect(config).await?;
            if config.run_migrations {
                run_migrations(db.pool()).await?;
            }
            Ok(Arc::new(PgSessionStore::new(db.into_pool())))
        }
        StoreProvider::Memory => {
            info!("Using in-memory session store; sessions are lost on restart");
            Ok(Arc::new(MemorySessionStore::new()))
        }
    }
}
