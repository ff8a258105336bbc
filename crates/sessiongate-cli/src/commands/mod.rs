//! CLI command definitions and dispatch.

pub mod client;
pub mod migrate;
pub mod sessions;

use clap::{Parser, Subcommand};

use sessiongate_core::config::AppConfig;
use sessiongate_core::error::AppError;

use crate::output::OutputFormat;

/// SessionGate: concurrent device limiter
#[derive(Debug, Parser)]
#[command(name = "sessiongate", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `default.toml` and per-environment files
    #[arg(short, long, default_value = "config", env = "SESSIONGATE_CONFIG_DIR")]
    pub config: String,

    /// Environment overlay to load
    #[arg(short, long, default_value = "development", env = "SESSIONGATE_ENV")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply database migrations
    Migrate,
    /// Inspect and evict sessions in the configured store
    Sessions(sessions::SessionsArgs),
    /// Act as a browser tab against a running server
    Client(client::ClientArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate => migrate::execute(&self.load_config()?).await,
            Commands::Sessions(args) => {
                sessions::execute(args, &self.load_config()?, self.format).await
            }
            Commands::Client(args) => client::execute(args, self.format).await,
        }
    }

    fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load(&self.config, &self.env)
    }
}
