// src/logging.rs

//! Logging setup for `procmux` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `PROCMUX_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`
//!
//! Logs are sent to STDERR. Captured command output is logged through the
//! same subscriber, one line per event, by [`log_event`].

use anyhow::Result;
use tracing::{error, info, warn};
use tracing_subscriber::fmt;

use crate::cli::LogLevel;
use crate::engine::{Event, EventKind};

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let level = match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => std::env::var("PROCMUX_LOG")
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(tracing::Level::INFO),
    };

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}

/// Default event handler used by the binary: one log line per event.
pub fn log_event(event: Event) {
    match event.kind() {
        EventKind::SystemError => error!(target: "procmux::output", "{event}"),
        EventKind::Stderr => warn!(target: "procmux::output", "{event}"),
        _ => info!(target: "procmux::output", "{event}"),
    }
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_level_strings_are_case_insensitive() {
        assert_eq!(parse_level_str("DEBUG"), Some(tracing::Level::DEBUG));
        assert_eq!(parse_level_str(" warning "), Some(tracing::Level::WARN));
        assert_eq!(parse_level_str("loud"), None);
    }
}
