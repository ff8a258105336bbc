//! Drive a session reconciler against a running server, as a browser tab would.

use std::time::Duration;

use clap::{Args, Subcommand};
use dialoguer::Select;
use serde::Serialize;
use tabled::Tabled;
use tracing::warn;

use sessiongate_client::{
    ClientError, DeviceSession, EventEnvelope, EventListener, HttpSessionApi, Reconciler,
    ReconcilerState, SessionApi,
};
use sessiongate_core::error::AppError;
use sessiongate_core::types::SessionId;

use crate::output::{self, OutputFormat};

/// Arguments for client commands
#[derive(Debug, Args)]
pub struct ClientArgs {
    /// Server base URL
    #[arg(long, default_value = "http://localhost:8000", env = "SESSIONGATE_SERVER")]
    pub server: String,

    /// Bearer access token issued by the identity provider
    #[arg(long, env = "SESSIONGATE_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Client subcommand
    #[command(subcommand)]
    pub command: ClientCommand,
}

/// Client subcommands
#[derive(Debug, Subcommand)]
pub enum ClientCommand {
    /// Register a session, resolving a device conflict interactively
    Login {
        /// Session ID issued at login
        session_id: String,
        /// Device label sent to the server
        #[arg(long)]
        device_info: Option<String>,
    },
    /// Log in, then stay until the session is evicted or ends
    Watch {
        /// Session ID issued at login
        session_id: String,
        /// Device label sent to the server
        #[arg(long)]
        device_info: Option<String>,
        /// Seconds between liveness checks
        #[arg(long, default_value_t = 30)]
        poll_seconds: u64,
    },
    /// Mark a session inactive
    Logout {
        /// Session ID to log out
        session_id: String,
    },
    /// List the account's active devices
    Devices,
}

/// Device display row
#[derive(Debug, Serialize, Tabled)]
struct DeviceRow {
    /// Session ID
    session_id: String,
    /// Device
    device: String,
    /// IP Address
    ip: String,
    /// Logged in
    logged_in_at: String,
}

impl From<&DeviceSession> for DeviceRow {
    fn from(d: &DeviceSession) -> Self {
        Self {
            session_id: d.session_id.to_string(),
            device: d.device_info.clone(),
            ip: d.ip_address.clone(),
            logged_in_at: d.logged_in_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Execute client commands
pub async fn execute(args: &ClientArgs, format: OutputFormat) -> Result<(), AppError> {
    let api = HttpSessionApi::new(&args.server, args.token.as_str())?;

    match &args.command {
        ClientCommand::Login {
            session_id,
            device_info,
        } => {
            let mut reconciler =
                Reconciler::new(api, SessionId::parse(session_id.as_str())?, device_info.clone());
            establish(&mut reconciler, choose_victim).await?;
        }
        ClientCommand::Watch {
            session_id,
            device_info,
            poll_seconds,
        } => {
            let mut reconciler =
                Reconciler::new(api, SessionId::parse(session_id.as_str())?, device_info.clone());
            if establish(&mut reconciler, choose_victim).await? != Established::Cancelled {
                watch(&mut reconciler, Duration::from_secs((*poll_seconds).max(1))).await?;
            }
        }
        ClientCommand::Logout { session_id } => {
            api.logout(&SessionId::parse(session_id.as_str())?).await?;
            output::print_success("Logged out");
        }
        ClientCommand::Devices => {
            let devices = api.list().await?;
            let rows: Vec<DeviceRow> = devices.iter().map(DeviceRow::from).collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}

/// How the initial registration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Established {
    /// The server accepted the session.
    Trusted,
    /// The server could not be reached; the session continues unconfirmed.
    Unconfirmed,
    /// The user declined to evict a device.
    Cancelled,
}

/// Register and, on conflict, let `pick` choose a device to evict.
///
/// Only a conflict needs user input. Other registration failures are
/// reported and the session carries on without confirmation.
async fn establish<A, F>(reconciler: &mut Reconciler<A>, pick: F) -> Result<Established, AppError>
where
    A: SessionApi,
    F: FnOnce(&[DeviceSession]) -> Result<Option<usize>, AppError>,
{
    let candidates = match reconciler.login().await.map(|state| state.clone()) {
        Ok(ReconcilerState::Trusted) => {
            output::print_success(&format!("Session {} registered", reconciler.session_id()));
            return Ok(Established::Trusted);
        }
        Ok(ReconcilerState::Conflict { candidates, .. }) => candidates,
        Ok(other) => return Err(AppError::internal(format!("Unexpected state {other:?}"))),
        Err(e) => return Ok(unconfirmed(reconciler.session_id(), &e)),
    };

    output::print_warning("Maximum number of active devices reached.");
    let Some(victim) = pick(&candidates)?.and_then(|i| candidates.get(i)) else {
        println!("Cancelled.");
        return Ok(Established::Cancelled);
    };

    match reconciler.resolve_conflict(&victim.session_id).await.map(|_| ()) {
        Ok(_) => {
            output::print_success(&format!(
                "Logged out {} and registered session {}",
                victim.device_info,
                reconciler.session_id()
            ));
            Ok(Established::Trusted)
        }
        Err(ClientError::LimitStillReached) => {
            Err(AppError::internal("Device limit still reached, please try again"))
        }
        Err(e) if reconciler.pending_eviction().is_some() => {
            Ok(unconfirmed(reconciler.session_id(), &e))
        }
        Err(e) => Err(e.into()),
    }
}

fn unconfirmed(session_id: &SessionId, error: &ClientError) -> Established {
    warn!(session_id = %session_id, error = %error, "Registration not confirmed");
    output::print_warning(&format!(
        "Server did not confirm session {session_id} ({error}); continuing unconfirmed"
    ));
    Established::Unconfirmed
}

/// Interactive victim selection; the trailing entry cancels.
fn choose_victim(candidates: &[DeviceSession]) -> Result<Option<usize>, AppError> {
    let mut items: Vec<String> = candidates
        .iter()
        .map(|d| {
            format!(
                "{} ({}, since {})",
                d.device_info,
                d.ip_address,
                d.logged_in_at.format("%Y-%m-%d %H:%M")
            )
        })
        .collect();
    items.push("Cancel".to_string());

    let choice = Select::new()
        .with_prompt("Log out one device to continue")
        .items(&items)
        .default(0)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

    Ok((choice < candidates.len()).then_some(choice))
}

/// Follow the account channel and poll liveness until the session ends.
async fn watch(
    reconciler: &mut Reconciler<HttpSessionApi>,
    poll: Duration,
) -> Result<(), AppError> {
    let mut listener = match EventListener::connect(
        reconciler.api().base_url(),
        reconciler.api().token(),
    )
    .await
    {
        Ok(listener) => Some(listener),
        Err(e) => {
            output::print_warning(&format!("Live updates unavailable ({e}); polling only"));
            None
        }
    };

    let mut ticker = tokio::time::interval(poll);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    println!("Watching session {} (Ctrl+C to log out)", reconciler.session_id());

    while !reconciler.is_terminated() {
        tokio::select! {
            event = next_event(&mut listener) => match event {
                Ok(Some(envelope)) => {
                    reconciler.on_event(&envelope);
                }
                Ok(None) => {
                    output::print_warning("Event socket closed; polling only");
                    listener = None;
                }
                Err(e) => {
                    warn!(error = %e, "Event socket failed");
                    listener = None;
                }
            },
            _ = ticker.tick() => {
                // Failures keep the current state; the next tick retries.
                let _ = reconciler.check_liveness().await;
            }
            _ = &mut ctrl_c => {
                reconciler.logout().await?;
            }
        }
    }

    if let ReconcilerState::Terminated { reason } = reconciler.state() {
        output::print_kv("Session", reconciler.session_id().as_str());
        output::print_kv("Ended", &format!("{reason:?}"));
    }
    if let Some(listener) = listener {
        let _ = listener.close().await;
    }
    Ok(())
}

async fn next_event(
    listener: &mut Option<EventListener>,
) -> Result<Option<EventEnvelope>, ClientError> {
    match listener.as_mut() {
        Some(l) => l.next_event().await,
        None => std::future::pending().await,
    }
}
