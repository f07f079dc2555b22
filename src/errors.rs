// src/errors.rs

//! Crate-wide error types.
//!
//! - [`ConfigError`] is fatal and aborts before any command is launched.
//! - [`RunError`] is scoped to one command and only ever surfaces as the
//!   content of a `SystemError` event.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::engine::Stream;

#[derive(Error, Debug)]
pub enum ProcmuxError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure to load a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("error reading config file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing YAML content: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("error parsing TOML content: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported config version: {found} (expected \"1\")")]
    UnsupportedVersion { found: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Command-scoped failure. The `Display` text becomes the `SystemError`
/// event content.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("error starting command: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("error creating {0} pipe: handle unavailable")]
    MissingPipe(Stream),

    #[error("error waiting for command: {0}")]
    Wait(#[source] std::io::Error),

    #[error("error terminating command on shutdown: {0}")]
    Kill(#[source] std::io::Error),

    #[error("error waiting for command: {0}")]
    Exited(ExitStatus),

    #[error("error waiting for command: terminated on shutdown ({0})")]
    Cancelled(ExitStatus),

    #[error("error reading {stream}: {source}")]
    Read {
        stream: Stream,
        #[source]
        source: std::io::Error,
    },
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ProcmuxError>;
