// src/exec/runner.rs

//! Process runner: one task per configured command.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::config::CommandSpec;
use crate::engine::{Event, EventSender, Stream};
use crate::errors::RunError;

use super::capture::spawn_capture;

/// How long the capturers may keep reading after the process exited before
/// they are stopped. Covers pipes inherited by background grandchildren.
pub const CAPTURE_GRACE: Duration = Duration::from_millis(100);

/// Spawn [`run_command`] on `tracker`.
///
/// The task is registered with the tracker before this returns, and the two
/// output capturers it starts later are registered on the same tracker.
pub fn spawn_runner(
    tracker: &TaskTracker,
    token: CancellationToken,
    sink: EventSender,
    command: Arc<CommandSpec>,
) -> JoinHandle<()> {
    let captures = tracker.clone();
    tracker.spawn(run_command(captures, token, sink, command))
}

/// Run one command to completion and report it on `sink`.
///
/// Event sequence for the command:
/// 1. `Start`
/// 2. zero or more `Stdout`/`Stderr` lines
/// 3. at most one `SystemError` (spawn failure, missing pipe, non-zero exit,
///    wait failure, or termination because `token` was cancelled)
/// 4. `End`, always, and always last: both capturers are joined before it
///    is sent.
///
/// `End` follows process exit. Output still buffered in the pipes is emitted
/// first; a pipe that stays open past [`CAPTURE_GRACE`] (a backgrounded
/// grandchild holding it) is abandoned.
///
/// Cancelling `token` kills the process.
pub async fn run_command(
    tracker: TaskTracker,
    token: CancellationToken,
    sink: EventSender,
    command: Arc<CommandSpec>,
) {
    emit(&sink, Event::start(&command)).await;
    let end = EndGuard::arm(tracker.clone(), sink.clone(), Arc::clone(&command));

    if let Err(err) = execute(&tracker, &token, &sink, &command).await {
        warn!(command = %command.name, error = %err, "command failed");
        emit(&sink, Event::command_error(&command, &err)).await;
    }

    end.release().await;
}

async fn execute(
    tracker: &TaskTracker,
    token: &CancellationToken,
    sink: &EventSender,
    command: &Arc<CommandSpec>,
) -> Result<(), RunError> {
    info!(
        command = %command.name,
        program = %command.command,
        args = ?command.args,
        "starting command process"
    );

    let mut child = Command::new(&command.command)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(RunError::Spawn)?;

    // Returning early drops `child`, which kills it (kill_on_drop).
    let stdout = child
        .stdout
        .take()
        .ok_or(RunError::MissingPipe(Stream::Stdout))?;
    let stderr = child
        .stderr
        .take()
        .ok_or(RunError::MissingPipe(Stream::Stderr))?;

    let stop_capture = token.child_token();
    let captures = [
        spawn_capture(
            tracker,
            token.clone(),
            stop_capture.clone(),
            stdout,
            sink.clone(),
            Arc::clone(command),
            Stream::Stdout,
        ),
        spawn_capture(
            tracker,
            token.clone(),
            stop_capture.clone(),
            stderr,
            sink.clone(),
            Arc::clone(command),
            Stream::Stderr,
        ),
    ];

    let outcome = wait_or_kill(&mut child, token, command).await;

    let joined = join_captures(captures, command);
    tokio::pin!(joined);
    if tokio::time::timeout(CAPTURE_GRACE, &mut joined).await.is_err() {
        debug!(
            command = %command.name,
            "output pipes still open after exit; stopping capture"
        );
        stop_capture.cancel();
        joined.await;
    }

    outcome
}

async fn join_captures(captures: [JoinHandle<()>; 2], command: &CommandSpec) {
    for handle in captures {
        if let Err(e) = handle.await {
            warn!(command = %command.name, error = %e, "output capture task failed");
        }
    }
}

/// Wait for the process, or kill it when `token` is cancelled first.
async fn wait_or_kill(
    child: &mut Child,
    token: &CancellationToken,
    command: &CommandSpec,
) -> Result<(), RunError> {
    let pid = child.id();

    tokio::select! {
        status = child.wait() => {
            let status = status.map_err(RunError::Wait)?;
            info!(
                command = %command.name,
                pid = ?pid,
                exit_code = ?status.code(),
                success = status.success(),
                "command process exited"
            );
            if status.success() {
                Ok(())
            } else {
                Err(RunError::Exited(status))
            }
        }

        () = token.cancelled() => {
            info!(command = %command.name, pid = ?pid, "cancellation requested; killing process");
            child.kill().await.map_err(RunError::Kill)?;
            let status = child.wait().await.map_err(RunError::Wait)?;
            Err(RunError::Cancelled(status))
        }
    }
}

async fn emit(sink: &EventSender, event: Event) {
    if sink.send(event).await.is_err() {
        debug!("event channel closed; dropping event");
    }
}

/// Guarantees the command's `End` event.
///
/// The normal path calls [`EndGuard::release`]. If the runner unwinds or is
/// dropped before that, `Drop` hands the `End` send to a tracked task.
struct EndGuard {
    tracker: TaskTracker,
    sink: Option<EventSender>,
    command: Arc<CommandSpec>,
}

impl EndGuard {
    fn arm(tracker: TaskTracker, sink: EventSender, command: Arc<CommandSpec>) -> Self {
        Self {
            tracker,
            sink: Some(sink),
            command,
        }
    }

    async fn release(mut self) {
        if let Some(sink) = &self.sink {
            emit(sink, Event::end(&self.command)).await;
        }
        // Disarm only once the send has completed.
        self.sink = None;
        debug!(command = %self.command.name, "runner finished");
    }
}

impl Drop for EndGuard {
    fn drop(&mut self) {
        let Some(sink) = self.sink.take() else {
            return;
        };

        warn!(command = %self.command.name, "runner exited abnormally; sending End");
        let end = Event::end(&self.command);
        if tokio::runtime::Handle::try_current().is_ok() {
            self.tracker.spawn(async move {
                let _ = sink.send(end).await;
            });
        }
    }
}
