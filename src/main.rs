//! SessionGate server: concurrent device limiter.
//!
//! Loads configuration, initializes logging and runs the HTTP server.

use tracing_subscriber::{EnvFilter, fmt};

use sessiongate_core::config::AppConfig;
use sessiongate_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        max_active_sessions = config.session.max_active_sessions,
        "Starting SessionGate"
    );

    if let Err(e) = sessiongate_api::run_server(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load `{dir}/default.toml`, the environment overlay, then `SESSIONGATE__*` variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let dir = std::env::var("SESSIONGATE_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("SESSIONGATE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}
