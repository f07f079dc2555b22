// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;

use std::io::{self, Write};

use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_and_validate};
use crate::engine::Supervisor;
use crate::errors::Result;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (fatal on any error, before anything is launched)
/// - the supervisor, with SIGINT/SIGTERM handling and the optional deadline
/// - the log handler that prints one line per event
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;
    info!(
        config = %args.config.display(),
        version = %cfg.version,
        commands = cfg.apps.len(),
        "config loaded"
    );

    if args.dry_run {
        print_dry_run(&cfg)?;
        return Ok(());
    }

    let mut supervisor = Supervisor::new(cfg.apps);
    if let Some(after) = args.timeout {
        supervisor = supervisor.with_deadline(after);
    }

    let total = supervisor.command_count();
    let report = supervisor.run(logging::log_event).await;

    if !report.is_complete(total) {
        warn!(
            ended = report.ended,
            total, "event stream stopped before every command ended"
        );
    }

    Ok(())
}

/// Simple dry-run output: print every command that would be launched.
fn print_dry_run(cfg: &ConfigFile) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "procmux dry-run")?;
    writeln!(out, "  version = {}", cfg.version)?;
    writeln!(out)?;
    writeln!(out, "apps ({}):", cfg.apps.len())?;
    for app in &cfg.apps {
        writeln!(out, "  - {}", app.name)?;
        writeln!(out, "      command: {}", app.command)?;
        if !app.args.is_empty() {
            writeln!(out, "      args: {:?}", app.args)?;
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
