use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use procmux::config::CommandSpec;
use procmux::engine::{Event, EventSender, Stream};
use procmux::exec::Launcher;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// A fake launcher that:
/// - records which commands were launched, in dispatch order
/// - emits Start, the scripted stdout lines, then End for each command
/// - optionally emits extra lines *after* End, to exercise late events
///
/// No process is spawned.
#[derive(Default)]
pub struct ScriptedLauncher {
    lines: HashMap<String, Vec<String>>,
    trailing: HashMap<String, Vec<String>>,
    launched: Arc<Mutex<Vec<String>>>,
}

impl ScriptedLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stdout lines emitted between Start and End for `name`.
    pub fn with_lines(mut self, name: &str, lines: &[&str]) -> Self {
        self.lines
            .insert(name.to_string(), lines.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Stdout lines emitted after End for `name`.
    pub fn with_trailing(mut self, name: &str, lines: &[&str]) -> Self {
        self.trailing
            .insert(name.to_string(), lines.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Shared view of launched command names.
    pub fn launched(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.launched)
    }
}

impl Launcher for ScriptedLauncher {
    fn launch(
        &self,
        tracker: &TaskTracker,
        token: CancellationToken,
        sink: EventSender,
        command: Arc<CommandSpec>,
    ) {
        self.launched.lock().unwrap().push(command.name.clone());

        let lines = self.lines.get(&command.name).cloned().unwrap_or_default();
        let trailing = self.trailing.get(&command.name).cloned().unwrap_or_default();

        tracker.spawn(async move {
            let _ = sink.send(Event::start(&command)).await;
            for line in lines {
                if token.is_cancelled() {
                    break;
                }
                let _ = sink.send(Event::line(&command, Stream::Stdout, line)).await;
            }
            let _ = sink.send(Event::end(&command)).await;

            for line in trailing {
                let _ = sink.send(Event::line(&command, Stream::Stdout, line)).await;
            }
        });
    }
}
