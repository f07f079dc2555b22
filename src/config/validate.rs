// src/config/validate.rs

use std::collections::HashSet;

use tracing::warn;

use crate::config::model::{ConfigFile, RawConfigFile, SUPPORTED_VERSION};
use crate::errors::ConfigError;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ConfigError;

    fn try_from(raw: RawConfigFile) -> Result<Self, Self::Error> {
        let version = validate_version(&raw)?;
        ensure_has_apps(&raw)?;
        validate_apps(&raw)?;
        warn_on_duplicate_names(&raw);
        Ok(ConfigFile::new_unchecked(version, raw.apps))
    }
}

fn validate_version(cfg: &RawConfigFile) -> Result<String, ConfigError> {
    match &cfg.version {
        Some(v) if v.to_string() == SUPPORTED_VERSION => Ok(SUPPORTED_VERSION.to_string()),
        Some(v) => Err(ConfigError::UnsupportedVersion {
            found: format!("{:?}", v.to_string()),
        }),
        None => Err(ConfigError::UnsupportedVersion {
            found: "<missing>".to_string(),
        }),
    }
}

fn ensure_has_apps(cfg: &RawConfigFile) -> Result<(), ConfigError> {
    if cfg.apps.is_empty() {
        return Err(ConfigError::Invalid(
            "config must contain at least one entry under `apps`".to_string(),
        ));
    }
    Ok(())
}

fn validate_apps(cfg: &RawConfigFile) -> Result<(), ConfigError> {
    for (idx, app) in cfg.apps.iter().enumerate() {
        if app.name.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "apps[{idx}] has an empty `name`"
            )));
        }
        if app.command.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "app '{}' has an empty `command`",
                app.name
            )));
        }
    }
    Ok(())
}

// Duplicate names are legal; the log lines just become ambiguous.
fn warn_on_duplicate_names(cfg: &RawConfigFile) {
    let mut seen = HashSet::new();
    for app in &cfg.apps {
        if !seen.insert(app.name.as_str()) {
            warn!(app = %app.name, "duplicate app name in config");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CommandSpec, RawVersion};

    fn raw(version: Option<RawVersion>, apps: Vec<CommandSpec>) -> RawConfigFile {
        RawConfigFile { version, apps }
    }

    fn echo() -> CommandSpec {
        CommandSpec::new("echo", "echo", ["hi"])
    }

    #[test]
    fn accepts_text_and_integer_one() {
        for v in [RawVersion::Text("1".into()), RawVersion::Integer(1)] {
            let cfg = ConfigFile::try_from(raw(Some(v), vec![echo()])).unwrap();
            assert_eq!(cfg.version, "1");
            assert_eq!(cfg.apps, vec![echo()]);
        }
    }

    #[test]
    fn rejects_other_versions() {
        for v in [
            Some(RawVersion::Text("2".into())),
            Some(RawVersion::Text("1.0".into())),
            Some(RawVersion::Float(1.0)),
            None,
        ] {
            let err = ConfigFile::try_from(raw(v, vec![echo()])).unwrap_err();
            assert!(
                matches!(err, ConfigError::UnsupportedVersion { .. }),
                "got {err:?}"
            );
        }
    }

    #[test]
    fn version_is_checked_before_apps() {
        let err = ConfigFile::try_from(raw(Some(RawVersion::Integer(3)), vec![])).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion { .. }));
    }

    #[test]
    fn rejects_empty_app_list_and_blank_fields() {
        let one = Some(RawVersion::Text("1".into()));

        let err = ConfigFile::try_from(raw(one.clone(), vec![])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = ConfigFile::try_from(raw(
            one.clone(),
            vec![echo(), CommandSpec::new(" ", "true", Vec::<String>::new())],
        ))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("apps[1]")));

        let err = ConfigFile::try_from(raw(
            one,
            vec![CommandSpec::new("blank", "", Vec::<String>::new())],
        ))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("blank")));
    }
}
