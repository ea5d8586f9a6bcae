//! Tracing subscriber setup.
//!
//! Logs go to stderr by default so stdout stays reserved for reports and
//! plots. The dashboard owns the terminal, so it logs to a file or not at all.
//! `RUST_LOG` overrides the level passed on the command line.

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::AppError;

/// Where log lines are written.
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    Off,
}

/// Initialize the global subscriber.
pub fn init_logging(level: &str, target: LogTarget<'_>) -> Result<(), AppError> {
    let default_filter = match target {
        LogTarget::Off => "off".to_string(),
        _ => format!("time_dilation={level},tdil={level}"),
    };
    let env_filter = match target {
        LogTarget::Off => EnvFilter::new(&default_filter),
        _ => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter)),
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match target {
        LogTarget::Stderr | LogTarget::Off => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(std::io::stderr().is_terminal())
                    .with_target(false),
            )
            .try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::io(format!("Failed to open log file '{}': {e}", path.display())))?;
            registry
                .with(
                    fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_target(true),
                )
                .try_init()
        }
    };

    result.map_err(|e| AppError::io(format!("Failed to initialize logging: {e}")))?;
    tracing::debug!(level, "logging initialized");
    Ok(())
}
