// src/engine/signal.rs

//! Interrupt/terminate handling.
//!
//! The first SIGINT or SIGTERM (Ctrl-C on non-unix platforms) cancels the
//! shared token. Later signals are absorbed: cancelling twice has no effect.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::{Event, EventSender};

/// Spawn the listener task. The caller aborts it once the run is over.
///
/// If the platform handler cannot be installed, a `system` SystemError event
/// is emitted and the run continues without signal handling.
pub fn spawn_shutdown_listener(token: CancellationToken, sink: EventSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut signals = match ShutdownSignals::install() {
            Ok(signals) => signals,
            Err(e) => {
                error!(error = %e, "failed to install shutdown signal handler");
                let _ = sink
                    .send(Event::system_error(format!(
                        "failed to install shutdown signal handler: {e}"
                    )))
                    .await;
                return;
            }
        };

        loop {
            let Some(name) = signals.recv().await else {
                debug!("signal stream ended");
                return;
            };

            if token.is_cancelled() {
                debug!(signal = name, "shutdown already in progress; ignoring signal");
                continue;
            }

            info!(signal = name, "shutdown signal received; cancelling all commands");
            token.cancel();
        }
    })
}

#[cfg(unix)]
struct ShutdownSignals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(&mut self) -> Option<&'static str> {
        tokio::select! {
            r = self.interrupt.recv() => r.map(|()| "SIGINT"),
            r = self.terminate.recv() => r.map(|()| "SIGTERM"),
        }
    }
}

#[cfg(not(unix))]
struct ShutdownSignals;

#[cfg(not(unix))]
impl ShutdownSignals {
    fn install() -> std::io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> Option<&'static str> {
        tokio::signal::ctrl_c().await.ok().map(|()| "ctrl-c")
    }
}
