//! Logging setup
//!
//! In MCP mode stdout carries the protocol, so logs go to a file under
//! `~/.protonion`. Every other command logs to stderr. `RUST_LOG` overrides
//! the level chosen by the verbosity flags.

use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

pub const LOG_DIR_NAME: &str = ".protonion";
pub const DEFAULT_LOG_FILE: &str = "mcp.log";

/// Environment variable naming the MCP log file
pub const LOG_FILE_ENV: &str = "PROTONION_LOG_FILE";

/// Level selected by the verbosity flags; `quiet` wins over the others
pub fn level_for(quiet: bool, debug: bool, verbose: bool) -> Level {
    if quiet {
        Level::ERROR
    } else if debug {
        Level::DEBUG
    } else if verbose {
        Level::TRACE
    } else {
        Level::INFO
    }
}

/// Path of the MCP log file
pub fn log_file_path() -> PathBuf {
    let log_dir = dirs::home_dir()
        .map(|home| home.join(LOG_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(LOG_DIR_NAME));
    let file_name = std::env::var(LOG_FILE_ENV)
        .ok()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());
    log_dir.join(file_name)
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from_level(level).into()))
}

/// Install the global subscriber
pub fn init_logging(level: Level, mcp_mode: bool) {
    if !mcp_mode {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter(level))
            .init();
        return;
    }

    let log_file = log_file_path();
    if let Some(dir) = log_file.parent() {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Failed to create log directory {}: {e}", dir.display());
        }
    }

    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
    {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_writer(std::sync::Mutex::new(file))
                .with_env_filter(env_filter(level))
                .with_ansi(false)
                .init();
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(env_filter(level))
                .with_ansi(false)
                .init();
            tracing::warn!(
                "Failed to open log file {}, using stderr: {}",
                log_file.display(),
                e
            );
        }
    }
}
