//! Operator view over the configured session store.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use sessiongate_auth::SessionLimiter;
use sessiongate_core::config::{AppConfig, StoreProvider};
use sessiongate_core::error::AppError;
use sessiongate_core::types::{AccountId, SessionId};
use sessiongate_database::connect_store;
use sessiongate_entity::session::Session;

use crate::output::{self, OutputFormat};

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionsArgs {
    /// Account whose sessions to inspect
    #[arg(short, long)]
    pub account: String,

    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionsCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionsCommand {
    /// List active sessions in login order
    List,
    /// Count active sessions
    Count,
    /// Delete a session outright
    Evict {
        /// Session ID
        session_id: String,
    },
}

/// Session display row
#[derive(Debug, Serialize, Tabled)]
struct SessionRow {
    /// Session ID
    session_id: String,
    /// Device
    device: String,
    /// IP Address
    ip: String,
    /// Logged in
    logged_in_at: String,
}

impl From<Session> for SessionRow {
    fn from(s: Session) -> Self {
        Self {
            session_id: s.session_id.to_string(),
            device: s.device_info,
            ip: s.ip_address,
            logged_in_at: s.logged_in_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Execute session commands
pub async fn execute(
    args: &SessionsArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    if config.database.provider == StoreProvider::Memory {
        output::print_warning("The memory store is process-local; it is always empty here.");
    }

    let account_id = AccountId::parse(args.account.as_str())?;
    let store = connect_store(&config.database).await?;

    match &args.command {
        SessionsCommand::List => {
            let rows: Vec<SessionRow> = store
                .list_active(&account_id)
                .await?
                .into_iter()
                .map(SessionRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        SessionsCommand::Count => {
            let count = store.count_active(&account_id).await?;
            let limit = SessionLimiter::new(config.session.clone()).resolve(&account_id);
            output::print_kv("Account", account_id.as_str());
            output::print_kv("Active", &count.to_string());
            output::print_kv("Limit", &limit.to_string());
        }
        SessionsCommand::Evict { session_id } => {
            let session_id = SessionId::parse(session_id.as_str())?;
            if store.delete_owned(&account_id, &session_id).await? {
                output::print_success(&format!("Session {session_id} deleted"));
                output::print_warning(
                    "Open tabs are not notified from the CLI; they log out on their next status check.",
                );
            } else {
                output::print_warning(&format!(
                    "No session {session_id} for account {account_id}"
                ));
            }
        }
    }

    Ok(())
}
