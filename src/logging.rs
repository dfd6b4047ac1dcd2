//! Tracing subscriber setup.
//!
//! `RUST_LOG` always wins. Without it the level is `info` with `--verbose`
//! and `warn` otherwise.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::AppError;

/// Where log lines go when no log file is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Nothing; stderr would corrupt the alternate screen.
    Silent,
}

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init(verbose: bool, log_file: Option<&Path>, target: LogTarget) -> Result<(), AppError> {
    let filter = env_filter(verbose);

    match (log_file, target) {
        (Some(path), _) => {
            let file = File::create(path)
                .map_err(|e| AppError::input(format!("Failed to open log file '{}': {e}", path.display())))?;
            let _ = tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .with(filter)
                .try_init();
        }
        (None, LogTarget::Stderr) => {
            let _ = tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .try_init();
        }
        (None, LogTarget::Silent) => {}
    }

    Ok(())
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive(verbose).into())
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "info" } else { "warn" }
}
