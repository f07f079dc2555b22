// src/config/model.rs

use std::fmt;

use serde::Deserialize;

/// The only config version this build understands.
pub const SUPPORTED_VERSION: &str = "1";

/// Top-level configuration as read from disk, before validation.
///
/// ```yaml
/// version: "1"
/// apps:
///   - name: api
///     command: ./target/debug/api
///     args: ["--port", "8080"]
///   - name: worker
///     command: sh
///     args: ["-c", "echo ready; sleep 60"]
/// ```
///
/// The TOML form uses `[[apps]]` tables with the same keys.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Version marker; must be `"1"`.
    #[serde(default)]
    pub version: Option<RawVersion>,

    /// Commands to launch, in declaration order.
    #[serde(default)]
    pub apps: Vec<CommandSpec>,
}

/// A version scalar as written in the file.
///
/// YAML and TOML users commonly write `version: 1` without quotes; that is
/// treated as the string `"1"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawVersion {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl fmt::Display for RawVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawVersion::Text(s) => f.write_str(s),
            RawVersion::Integer(n) => write!(f, "{n}"),
            // `{:?}` keeps the fractional part, so `1.0` never passes as "1".
            RawVersion::Float(x) => write!(f, "{x:?}"),
        }
    }
}

/// One unit of work: an executable plus its arguments.
///
/// Immutable once loaded. The supervisor hands each process runner its own
/// `Arc` to it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandSpec {
    /// Display name used in every log line for this command.
    pub name: String,

    /// Executable to run (looked up on `PATH` when not a path).
    pub command: String,

    /// Arguments passed verbatim, without shell interpretation.
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// A validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see `validate.rs`), so
/// holding one means the version gate and command checks have passed.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub version: String,
    pub apps: Vec<CommandSpec>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(version: String, apps: Vec<CommandSpec>) -> Self {
        Self { version, apps }
    }
}
