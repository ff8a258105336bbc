//! Database migration command.

use sessiongate_core::config::{AppConfig, StoreProvider};
use sessiongate_core::error::AppError;
use sessiongate_database::DatabasePool;
use sessiongate_database::migration::run_migrations;

use crate::output;

/// Apply pending migrations to the configured PostgreSQL database.
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    if config.database.provider != StoreProvider::Postgres {
        output::print_warning("The memory store has no schema; nothing to migrate.");
        return Ok(());
    }

    println!("Running database migrations...");
    let pool = DatabasePool::connect(&config.database).await?;
    run_migrations(pool.pool()).await?;
    output::print_success("All migrations applied successfully.");
    Ok(())
}
