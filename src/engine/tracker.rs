// src/engine/tracker.rs

//! Completion tracker: the single consumer of the event channel.

use tracing::{debug, warn};

use super::{Event, EventKind, EventReceiver};

/// What [`drain`] observed before returning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Events handed to the handler.
    pub events: usize,
    /// `End` events among them.
    pub ended: usize,
}

impl DrainReport {
    /// True once `ended` reached the number of launched commands.
    pub fn is_complete(&self, total_commands: usize) -> bool {
        self.ended >= total_commands
    }
}

/// Forward events to `handler` in arrival order until `total_commands`
/// `End` events have been seen.
///
/// - The handler runs synchronously; the next `recv` only happens after it
///   returns.
/// - Returns as soon as the last `End` arrives. It does **not** wait for the
///   channel to close, and anything still queued after that point is left in
///   the receiver.
/// - With `total_commands == 0` it returns immediately.
/// - If every sender is dropped first, it returns early instead of waiting
///   forever; [`DrainReport::is_complete`] is then false.
pub async fn drain<F>(rx: &mut EventReceiver, total_commands: usize, mut handler: F) -> DrainReport
where
    F: FnMut(Event),
{
    let mut report = DrainReport::default();
    let mut remaining = total_commands;

    while remaining > 0 {
        let Some(event) = rx.recv().await else {
            warn!(
                remaining,
                "event channel closed before every command reported completion"
            );
            break;
        };

        let is_end = event.kind() == EventKind::End;
        handler(event);
        report.events += 1;

        if is_end {
            report.ended += 1;
            remaining -= 1;
        }
    }

    debug!(events = report.events, ended = report.ended, "event drain finished");
    report
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::CommandSpec;
    use crate::engine::{Stream, event_channel_with_capacity};

    fn cmd(name: &str) -> Arc<CommandSpec> {
        Arc::new(CommandSpec::new(name, "true", Vec::<String>::new()))
    }

    #[tokio::test]
    async fn stops_at_last_end_without_channel_close() {
        let (tx, mut rx) = event_channel_with_capacity(8);
        let (a, b) = (cmd("a"), cmd("b"));

        for e in [
            Event::start(&a),
            Event::start(&b),
            Event::line(&a, Stream::Stdout, "x"),
            Event::end(&a),
            Event::end(&b),
            Event::line(&b, Stream::Stdout, "late"),
        ] {
            tx.send(e).await.unwrap();
        }

        let mut seen = Vec::new();
        let report = drain(&mut rx, 2, |e| seen.push(e.kind())).await;

        assert_eq!(report, DrainReport { events: 5, ended: 2 });
        assert!(report.is_complete(2));
        assert_eq!(seen.last(), Some(&EventKind::End));

        // The trailing line is still queued; tx was never dropped.
        assert_eq!(rx.try_recv().map(|e| e.into_content()).ok(), Some("late".to_string()));
        drop(tx);
    }

    #[tokio::test]
    async fn zero_commands_returns_immediately() {
        let (_tx, mut rx) = event_channel_with_capacity(1);
        let report = drain(&mut rx, 0, |_| panic!("no events expected")).await;
        assert_eq!(report, DrainReport::default());
    }

    #[tokio::test]
    async fn closed_channel_ends_drain_early() {
        let (tx, mut rx) = event_channel_with_capacity(4);
        let a = cmd("a");
        tx.send(Event::start(&a)).await.unwrap();
        drop(tx);

        let report = drain(&mut rx, 1, |_| {}).await;
        assert_eq!(report.events, 1);
        assert!(!report.is_complete(1));
    }
}
