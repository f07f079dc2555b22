// src/config/loader.rs

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::ConfigError;

/// On-disk syntax of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from the file extension: `.toml` is TOML, anything
    /// else (`.yml`, `.yaml`, no extension) is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Deserialize config text without any semantic validation.
pub fn parse_str(contents: &str, format: ConfigFormat) -> Result<RawConfigFile, ConfigError> {
    let raw = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(contents)?,
        ConfigFormat::Toml => toml::from_str(contents)?,
    };
    Ok(raw)
}

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs deserialization; it does **not** check the version or
/// the command list. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let format = ConfigFormat::from_path(path);
    debug!(path = %path.display(), ?format, "parsing config file");
    parse_str(&contents, format)
}

/// Load a configuration file from path and validate it.
///
/// This is the entry point the binary uses:
///
/// - Reads YAML or TOML.
/// - Rejects any version other than `"1"`.
/// - Rejects an empty command list and commands without a name or executable.
///
/// Either the whole file is accepted or nothing is.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile, ConfigError> {
    let raw_config = load_from_path(&path)?;
    ConfigFile::try_from(raw_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("apps.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("apps.TOML")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("apps.yml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("apps")), ConfigFormat::Yaml);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_from_path("definitely/not/here.yml").unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }), "got {err:?}");
    }

    #[test]
    fn reading_a_directory_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_from_path(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }), "got {err:?}");
    }

    #[test]
    fn toml_apps_tables_parse() {
        let raw = parse_str(
            r#"
version = "1"

[[apps]]
name = "a"
command = "echo"
args = ["hi"]

[[apps]]
name = "b"
command = "true"
"#,
            ConfigFormat::Toml,
        )
        .unwrap();

        assert_eq!(raw.apps.len(), 2);
        assert_eq!(raw.apps[0].args, vec!["hi".to_string()]);
        assert!(raw.apps[1].args.is_empty());
    }
}
