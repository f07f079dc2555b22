// src/engine/supervisor.rs

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use crate::config::CommandSpec;
use crate::exec::{Launcher, ProcessLauncher};

use super::channel::{EVENT_CHANNEL_CAPACITY, event_channel_with_capacity};
use super::signal::spawn_shutdown_listener;
use super::tracker::{DrainReport, drain};
use super::Event;

/// Lifecycle coordinator.
///
/// Owns the shared cancellation token, launches every command through a
/// [`Launcher`], drains the event channel and joins all spawned work.
///
/// ```no_run
/// # async fn demo() {
/// use procmux::config::CommandSpec;
/// use procmux::engine::Supervisor;
///
/// let report = Supervisor::new([CommandSpec::new("hi", "echo", ["hello"])])
///     .run(|event| println!("{event}"))
///     .await;
/// assert_eq!(report.ended, 1);
/// # }
/// ```
pub struct Supervisor<L: Launcher = ProcessLauncher> {
    commands: Vec<Arc<CommandSpec>>,
    launcher: L,
    token: CancellationToken,
    capacity: usize,
    deadline: Option<Duration>,
    handle_signals: bool,
}

impl<L: Launcher> fmt::Debug for Supervisor<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("commands", &self.commands.len())
            .field("capacity", &self.capacity)
            .field("deadline", &self.deadline)
            .field("handle_signals", &self.handle_signals)
            .finish_non_exhaustive()
    }
}

impl Supervisor<ProcessLauncher> {
    /// Supervisor that runs real processes, with signal handling enabled and
    /// the default channel capacity.
    pub fn new(commands: impl IntoIterator<Item = CommandSpec>) -> Self {
        Self {
            commands: commands.into_iter().map(Arc::new).collect(),
            launcher: ProcessLauncher,
            token: CancellationToken::new(),
            capacity: EVENT_CHANNEL_CAPACITY,
            deadline: None,
            handle_signals: true,
        }
    }
}

impl<L: Launcher> Supervisor<L> {
    /// Replace the launcher (tests use a scripted one).
    pub fn with_launcher<M: Launcher>(self, launcher: M) -> Supervisor<M> {
        Supervisor {
            commands: self.commands,
            launcher,
            token: self.token,
            capacity: self.capacity,
            deadline: self.deadline,
            handle_signals: self.handle_signals,
        }
    }

    /// Event channel depth. Clamped to at least 1.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Cancel every command once `after` has elapsed.
    pub fn with_deadline(mut self, after: Duration) -> Self {
        self.deadline = Some(after);
        self
    }

    /// Whether SIGINT/SIGTERM cancel the run.
    pub fn with_signal_handler(mut self, enabled: bool) -> Self {
        self.handle_signals = enabled;
        self
    }

    /// Handle to the shared token; cancelling it stops the whole run.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Launch every command, feed all events to `handler`, and return once
    /// every command has ended and every runner and capturer task has been
    /// joined.
    ///
    /// Events that arrive after the last `End` while the join is pending are
    /// still passed to `handler` and counted in the report.
    pub async fn run<F>(self, mut handler: F) -> DrainReport
    where
        F: FnMut(Event),
    {
        let total = self.commands.len();
        let (tx, mut rx) = event_channel_with_capacity(self.capacity);
        let tracker = TaskTracker::new();

        let signal_listener = self
            .handle_signals
            .then(|| spawn_shutdown_listener(self.token.clone(), tx.clone()));
        let deadline = self
            .deadline
            .map(|after| spawn_deadline(self.token.clone(), after));

        info!(commands = total, capacity = self.capacity, "launching commands");
        for command in &self.commands {
            // Each launch registers its task on `tracker` before returning.
            self.launcher
                .launch(&tracker, self.token.clone(), tx.clone(), Arc::clone(command));
        }
        tracker.close();
        drop(tx);

        let mut report = drain(&mut rx, total, &mut handler).await;

        debug!(tasks = tracker.len(), "waiting for runners and capturers to finish");
        let joined = tracker.wait();
        tokio::pin!(joined);
        loop {
            tokio::select! {
                () = &mut joined => break,
                Some(event) = rx.recv() => {
                    debug!(%event, "event arrived after all commands ended");
                    handler(event);
                    report.events += 1;
                }
            }
        }

        for handle in signal_listener.into_iter().chain(deadline) {
            handle.abort();
        }

        info!(
            events = report.events,
            ended = report.ended,
            cancelled = self.token.is_cancelled(),
            "all commands finished"
        );
        report
    }
}

fn spawn_deadline(token: CancellationToken, after: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            () = tokio::time::sleep(after) => {
                info!(?after, "deadline reached; cancelling all commands");
                token.cancel();
            }
            () = token.cancelled() => {}
        }
    })
}
