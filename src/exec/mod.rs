// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the configured commands,
//! using `tokio::process::Command`, and reporting everything that happens to
//! the engine as [`Event`](crate::engine::Event)s.
//!
//! - [`runner`] runs one command: Start, spawn, wait or kill, End.
//! - [`capture`] turns one output pipe into a stream of line events, framed
//!   by [`line_codec`].
//! - [`backend`] provides the `Launcher` trait the supervisor dispatches
//!   through, and the `ProcessLauncher` used in production. Tests can replace
//!   it with a scripted launcher that never spawns a process.

pub mod backend;
pub mod capture;
pub mod line_codec;
pub mod runner;

pub use backend::{Launcher, ProcessLauncher};
pub use capture::{capture_output, spawn_capture};
pub use line_codec::{LineDecoder, MAX_LINE_BYTES};
pub use runner::{run_command, spawn_runner};
