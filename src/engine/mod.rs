// src/engine/mod.rs

//! Fan-in engine for procmux.
//!
//! This module ties together:
//! - the event types every producer emits ([`Event`], [`EventKind`])
//! - the bounded event channel shared by all producers ([`channel`])
//! - the single consumer that counts `End` events ([`tracker`])
//! - the lifecycle coordinator that launches every command, installs the
//!   shutdown handler and joins all spawned work ([`supervisor`])

use std::fmt;
use std::sync::Arc;

use crate::config::CommandSpec;

pub mod channel;
pub mod signal;
pub mod supervisor;
pub mod tracker;

pub use channel::{
    EVENT_CHANNEL_CAPACITY, EventReceiver, EventSender, event_channel, event_channel_with_capacity,
};
pub use supervisor::Supervisor;
pub use tracker::{DrainReport, drain};

/// Name shown for events that no command owns.
pub const SYSTEM_SOURCE: &str = "system";

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The command's process runner started.
    Start,
    /// One line captured from the command's stdout.
    Stdout,
    /// One line captured from the command's stderr.
    Stderr,
    /// The command's process runner finished. Always the command's last event.
    End,
    /// Something went wrong; content is a human-readable description.
    SystemError,
}

impl EventKind {
    /// Label used in log lines.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Start => "OutputStart",
            EventKind::Stdout => "OutputStdout",
            EventKind::Stderr => "OutputStderr",
            EventKind::End => "OutputEnd",
            EventKind::SystemError => "SystemError",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One of a process' two output streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    /// Event kind emitted for lines read from this stream.
    pub fn event_kind(self) -> EventKind {
        match self {
            Stream::Stdout => EventKind::Stdout,
            Stream::Stderr => EventKind::Stderr,
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Stdout => f.write_str("stdout"),
            Stream::Stderr => f.write_str("stderr"),
        }
    }
}

/// A single occurrence flowing through the event channel.
///
/// Created by a producer and consumed exactly once by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    content: String,
    kind: EventKind,
    source: Option<Arc<CommandSpec>>,
}

impl Event {
    pub fn start(command: &Arc<CommandSpec>) -> Self {
        Self {
            content: String::new(),
            kind: EventKind::Start,
            source: Some(Arc::clone(command)),
        }
    }

    pub fn end(command: &Arc<CommandSpec>) -> Self {
        Self {
            content: String::new(),
            kind: EventKind::End,
            source: Some(Arc::clone(command)),
        }
    }

    /// A captured output line.
    pub fn line(command: &Arc<CommandSpec>, stream: Stream, line: impl Into<String>) -> Self {
        Self {
            content: line.into(),
            kind: stream.event_kind(),
            source: Some(Arc::clone(command)),
        }
    }

    /// An error scoped to one command.
    pub fn command_error(command: &Arc<CommandSpec>, message: impl fmt::Display) -> Self {
        Self {
            content: message.to_string(),
            kind: EventKind::SystemError,
            source: Some(Arc::clone(command)),
        }
    }

    /// An error attributable to the supervisor itself.
    pub fn system_error(message: impl fmt::Display) -> Self {
        Self {
            content: message.to_string(),
            kind: EventKind::SystemError,
            source: None,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn source(&self) -> Option<&CommandSpec> {
        self.source.as_deref()
    }

    /// Owning command's name, or `"system"`.
    pub fn command_name(&self) -> &str {
        self.source
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or(SYSTEM_SOURCE)
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

/// `[<name>::<kind>]: <content>`
impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}::{}]: {}",
            self.command_name(),
            self.kind,
            self.content
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd() -> Arc<CommandSpec> {
        Arc::new(CommandSpec::new("web", "echo", ["hi"]))
    }

    #[test]
    fn display_matches_log_format() {
        let c = cmd();
        assert_eq!(Event::start(&c).to_string(), "[web::OutputStart]: ");
        assert_eq!(
            Event::line(&c, Stream::Stdout, "hello").to_string(),
            "[web::OutputStdout]: hello"
        );
        assert_eq!(
            Event::line(&c, Stream::Stderr, "oops").to_string(),
            "[web::OutputStderr]: oops"
        );
        assert_eq!(Event::end(&c).to_string(), "[web::OutputEnd]: ");
    }

    #[test]
    fn unowned_events_are_attributed_to_system() {
        let e = Event::system_error("no signal handler");
        assert_eq!(e.command_name(), "system");
        assert!(e.source().is_none());
        assert_eq!(e.to_string(), "[system::SystemError]: no signal handler");
    }

    #[test]
    fn command_errors_keep_their_source() {
        let e = Event::command_error(&cmd(), "boom");
        assert_eq!(e.kind(), EventKind::SystemError);
        assert_eq!(e.command_name(), "web");
        assert_eq!(e.content(), "boom");
    }
}
