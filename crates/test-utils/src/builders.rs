#![allow(dead_code)]

use procmux::config::{CommandSpec, ConfigFile, RawConfigFile, RawVersion};
use procmux::errors::ConfigError;

/// `sh -c <script>` under the given name.
pub fn shell(name: &str, script: &str) -> CommandSpec {
    CommandSpec::new(name, "sh", ["-c", script])
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                version: Some(RawVersion::Text("1".to_string())),
                apps: Vec::new(),
            },
        }
    }

    pub fn with_version(mut self, version: Option<RawVersion>) -> Self {
        self.config.version = version;
        self
    }

    pub fn with_app(mut self, app: CommandSpec) -> Self {
        self.config.apps.push(app);
        self
    }

    pub fn with_shell_app(self, name: &str, script: &str) -> Self {
        self.with_app(shell(name, script))
    }

    pub fn try_build(self) -> Result<ConfigFile, ConfigError> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
