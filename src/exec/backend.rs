// src/exec/backend.rs

//! Pluggable launcher abstraction.
//!
//! The supervisor talks to a `Launcher` instead of spawning processes itself.
//! This makes it easy to swap in a fake launcher in tests while keeping the
//! production implementation in [`runner`](super::runner).

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::CommandSpec;
use crate::engine::EventSender;

use super::runner::spawn_runner;

/// Trait abstracting how one command is started.
///
/// Contract for implementations:
/// - register every unit of work on `tracker` (via `tracker.spawn`) before
///   returning, so the supervisor's join can never miss it;
/// - emit exactly one `Start` and exactly one `End` event for `command`, with
///   `End` last.
pub trait Launcher: Send + Sync {
    fn launch(
        &self,
        tracker: &TaskTracker,
        token: CancellationToken,
        sink: EventSender,
        command: Arc<CommandSpec>,
    );
}

/// Launcher used in production: one OS process per command.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(
        &self,
        tracker: &TaskTracker,
        token: CancellationToken,
        sink: EventSender,
        command: Arc<CommandSpec>,
    ) {
        // Tracked by `tracker`; the handle itself is not needed.
        let _handle = spawn_runner(tracker, token, sink, command);
    }
}
