// src/exec/capture.rs

//! Output capturer: one task per process pipe.

use std::sync::Arc;

use tokio::io::AsyncRead;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::config::CommandSpec;
use crate::engine::{Event, EventSender, Stream};
use crate::errors::RunError;

use super::line_codec::LineDecoder;

/// Spawn [`capture_output`] on `tracker`.
pub fn spawn_capture<R>(
    tracker: &TaskTracker,
    shutdown: CancellationToken,
    stop: CancellationToken,
    pipe: R,
    sink: EventSender,
    command: Arc<CommandSpec>,
    stream: Stream,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tracker.spawn(capture_output(shutdown, stop, pipe, sink, command, stream))
}

/// Read `pipe` one line at a time and emit a `Stdout`/`Stderr` event per
/// non-empty line, in read order.
///
/// Stops at end-of-file, on a read error (reported as a `SystemError` for
/// `command`), or when either token fires:
/// - `stop` ends the capture once the pipe has nothing more to read right
///   now. Buffered output is still emitted first, so the runner cancels it
///   after the process exited to let go of a pipe a grandchild keeps open.
///   `stop` should be a child of `shutdown`.
/// - `shutdown` is also checked once per line before emitting, so a line read
///   after shutdown is dropped. A line whose send already started is still
///   delivered.
///
/// Framing is done by [`LineDecoder`]: lines are split on `\n`, a trailing
/// `\r` is removed, overlong lines are chunked and invalid UTF-8 is replaced.
pub async fn capture_output<R>(
    shutdown: CancellationToken,
    stop: CancellationToken,
    pipe: R,
    sink: EventSender,
    command: Arc<CommandSpec>,
    stream: Stream,
) where
    R: AsyncRead + Unpin,
{
    let mut lines = FramedRead::new(pipe, LineDecoder::default());
    let mut emitted = 0usize;

    loop {
        let next = tokio::select! {
            biased;
            next = lines.next() => next,
            () = stop.cancelled() => {
                debug!(command = %command.name, %stream, "capture stopped while waiting for output");
                break;
            }
        };

        let line = match next {
            None => break,
            Some(Ok(line)) => line,
            Some(Err(source)) => {
                warn!(command = %command.name, %stream, error = %source, "failed to read output");
                let err = RunError::Read { stream, source };
                let _ = sink.send(Event::command_error(&command, err)).await;
                break;
            }
        };

        if shutdown.is_cancelled() {
            debug!(command = %command.name, %stream, "cancelled; dropping line read after shutdown");
            break;
        }

        if line.is_empty() {
            continue;
        }

        if sink.send(Event::line(&command, stream, line)).await.is_err() {
            debug!(command = %command.name, %stream, "event channel closed; stopping capture");
            break;
        }
        emitted += 1;
    }

    debug!(command = %command.name, %stream, lines = emitted, "output capture finished");
}
