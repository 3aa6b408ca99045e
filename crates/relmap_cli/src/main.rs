//! `relmap` interactive shell.
//!
//! # Responsibility
//! - Resolve configuration (file, environment, flags) and start logging.
//! - Build the process-wide session factory and verify it once.
//! - Run the menu loop until exit or end of input.
//!
//! # Invariants
//! - The session factory is closed on every exit path after it was built.

mod menu;
mod shell;

use clap::Parser;
use log::{error, info, warn};
use relmap_core::db::session;
use relmap_core::{init_logging, AppConfig};
use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Parser, Debug)]
#[command(author, version, about = "Relational mapping demo shell", long_about = None)]
struct Args {
    /// TOML configuration file (defaults to `relmap.toml` when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database URL: a file path, `sqlite://<path>` or `:memory:`
    #[arg(long)]
    database_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Directory for rolling log files
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

/// Closes the global session factory when dropped.
struct ShutdownGuard;

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        if session::shutdown() {
            info!("event=app_exit module=cli status=ok");
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=app_exit module=cli status=error error={err}");
            eprintln!("relmap: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(url) = args.database_url {
        config.database.url = url;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(dir) = args.log_dir {
        config.logging.dir = Some(dir);
    }

    let log_dir = config
        .logging
        .dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));
    // Logging is optional for the shell; keep going with stderr only.
    if let Err(err) = init_logging(&config.logging.level, &log_dir) {
        eprintln!("relmap: logging disabled: {err}");
    }
    info!(
        "event=app_start module=cli status=ok version={} database_url={}",
        relmap_core::core_version(),
        config.database.url
    );

    let factory = session::initialize(&config.database)?;
    let _guard = ShutdownGuard;
    if !session::test_connection() {
        warn!("event=db_ping module=cli status=error");
        eprintln!("relmap: warning: database round-trip check failed");
    }

    let stdin = io::stdin();
    shell::run(factory, &mut stdin.lock())?;
    Ok(())
}
