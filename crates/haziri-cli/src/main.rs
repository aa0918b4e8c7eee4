//! Haziri admin console - command-line front end.
//!
//! Signs in against the Haziri backend and manages employees, attendance,
//! leave requests and the holiday calendar. The session persists between
//! runs; expiring tokens are refreshed transparently.

mod cli;
mod commands;
mod format;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use haziri_core::{ApiClient, ApiError, AuthEvent, Config};

use cli::Cli;

/// Prefix of the daily log files in the log directory
const LOG_FILE_PREFIX: &str = "haziri.log";

/// Initialize the tracing subscriber for logging.
///
/// Terminal output honors RUST_LOG (default `warn`). When a log directory is
/// available, a daily rolling file also records `info` and above. The
/// returned guard must be held until exit so buffered lines are flushed.
fn init_tracing(log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
    let stderr_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir.filter(|dir| std::fs::create_dir_all(dir).is_ok()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new("info"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_filter(stderr_filter))
        .with(file_layer)
        .init();

    guard
}

/// Print session notices published while the command ran. Returns whether
/// the user was told to sign in again.
fn report_auth_events(events: &mut broadcast::Receiver<AuthEvent>) -> bool {
    let mut login_required = false;
    while let Ok(event) = events.try_recv() {
        if let AuthEvent::LoginRequired { reason } = event {
            eprintln!("Your session has ended ({}).", reason);
            login_required = true;
        }
    }
    if login_required {
        eprintln!("Run `haziri login` to sign in again.");
    }
    login_required
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(ref url) = cli.api_url {
        config.api_url = url.clone();
    }

    let _guard = init_tracing(config.log_dir().ok());
    info!(api_url = %config.base_url(), "Haziri admin console starting");

    let client = ApiClient::from_config(&config)?;
    let mut events = client.subscribe();

    let result = commands::run(&client, &mut config, &cli).await;

    let notified = report_auth_events(&mut events);
    if let Err(ref e) = result {
        warn!(error = %e, "Command failed");
        let session_ended = e
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::is_auth_failure);
        if session_ended && !notified {
            eprintln!("Run `haziri login` to sign in.");
        }
    }
    result
}
