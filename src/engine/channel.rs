// src/engine/channel.rs

//! The shared event channel.
//!
//! A bounded tokio `mpsc` queue: every process runner and output capturer
//! holds a cloned [`EventSender`], the tracker owns the single
//! [`EventReceiver`]. When the queue is full, `send` waits for the consumer;
//! that is the only back-pressure in the system. Never swap this for an
//! unbounded channel.

use tokio::sync::mpsc;

use super::Event;

/// Default queue depth.
pub const EVENT_CHANNEL_CAPACITY: usize = 2;

pub type EventSender = mpsc::Sender<Event>;
pub type EventReceiver = mpsc::Receiver<Event>;

/// Create a channel with [`EVENT_CHANNEL_CAPACITY`] slots.
pub fn event_channel() -> (EventSender, EventReceiver) {
    event_channel_with_capacity(EVENT_CHANNEL_CAPACITY)
}

/// Create a channel with `capacity` slots, at least one.
///
/// tokio has no rendezvous channel, so zero is raised to one.
pub fn event_channel_with_capacity(capacity: usize) -> (EventSender, EventReceiver) {
    mpsc::channel(capacity.max(1))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::config::CommandSpec;
    use crate::engine::EventKind;

    #[tokio::test]
    async fn full_channel_blocks_instead_of_dropping() {
        let cmd = Arc::new(CommandSpec::new("a", "true", Vec::<String>::new()));
        let (tx, mut rx) = event_channel();

        tx.send(Event::start(&cmd)).await.unwrap();
        tx.send(Event::end(&cmd)).await.unwrap();
        assert!(tx.try_send(Event::start(&cmd)).is_err());

        let blocked =
            tokio::time::timeout(Duration::from_millis(50), tx.send(Event::start(&cmd))).await;
        assert!(blocked.is_err(), "send should wait while the queue is full");

        assert_eq!(rx.recv().await.map(|e| e.kind()), Some(EventKind::Start));
        tx.send(Event::start(&cmd)).await.unwrap();
    }

    #[tokio::test]
    async fn zero_capacity_holds_one_event() {
        let cmd = Arc::new(CommandSpec::new("a", "true", Vec::<String>::new()));
        let (tx, mut rx) = event_channel_with_capacity(0);

        tx.send(Event::start(&cmd)).await.unwrap();
        assert!(tx.try_send(Event::end(&cmd)).is_err());
        assert_eq!(rx.recv().await.map(|e| e.kind()), Some(EventKind::Start));
    }
}
