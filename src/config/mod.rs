// src/config/mod.rs

//! Configuration loading and validation for procmux.
//!
//! Responsibilities:
//! - Define the serde-backed data model (`model.rs`).
//! - Load a config file from disk as YAML or TOML (`loader.rs`).
//! - Gate on the config version and validate the command list (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{ConfigFormat, load_and_validate, load_from_path, parse_str};
pub use model::{CommandSpec, ConfigFile, RawConfigFile, RawVersion, SUPPORTED_VERSION};
