//! Logging subsystem setup.
//!
//! `RUST_LOG` always wins. Without it the level comes from the main
//! configuration and output goes to `log_path` or to stderr.

use crate::configuration::{Configuration, ConfigurationError};
use std::{fs, fs::OpenOptions, sync::Mutex};
use tracing::error;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

/// Maps a configured level name onto a filter, `None` when it is not known.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.trim().to_ascii_lowercase().as_str() {
        "disabled" | "off" => Some(LevelFilter::OFF),
        "fatal" | "error" => Some(LevelFilter::ERROR),
        "warn" | "warning" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}

/// Intialize the logging subsystem
pub fn init(configuration: &Configuration) -> Result<(), ConfigurationError> {
    let from_env = std::env::var_os(EnvFilter::DEFAULT_ENV).is_some();
    let configured = configuration.effective_log_level();
    let level = parse_level(configured);

    if !from_env && level == Some(LevelFilter::OFF) {
        return Ok(());
    }

    let filter = EnvFilter::builder()
        .with_default_directive(level.unwrap_or(LevelFilter::ERROR).into())
        .from_env_lossy();

    // A subscriber installed earlier in the process keeps precedence.
    let installed = match configuration.log_path() {
        Some(path) => {
            let failed = |cause: std::io::Error| ConfigurationError::FailedToWriteData {
                path: path.to_path_buf(),
                cause: Box::new(cause),
            };
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(failed)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(failed)?;

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    if installed.is_ok() && level.is_none() {
        error!("Unrecognized log level: {}", configured);
    }
    Ok(())
}
