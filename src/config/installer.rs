use super::{
    env_store::MergePolicy,
    errors::{ConfigError, ConfigResult},
};
use serde::Deserialize;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub const INSTALLER_CONFIG_FILENAME: &str = "installer.yml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawInstallerConfig {
    #[serde(default)]
    update_allow_list: Option<Vec<String>>,
}

/// Settings of the installer itself (`installer.yml`), independent from the
/// environment it deploys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerConfig {
    directory: PathBuf,
    filename: String,
    update_allow_list: Vec<String>,
}

impl InstallerConfig {
    /// Default settings bound to `directory/filename`.
    pub fn new(directory: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            filename: filename.into(),
            update_allow_list: Vec::new(),
        }
    }

    /// Loads `directory/filename`, falling back to defaults when the file is missing.
    pub fn load(directory: impl AsRef<Path>, filename: &str) -> ConfigResult<Self> {
        let mut config = Self::new(directory.as_ref(), filename);
        let path = config.filepath();
        if !path.is_file() {
            return Ok(config);
        }

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let yaml_error = |source| ConfigError::Yaml {
            path: path.clone(),
            source,
        };
        let value: Value = serde_yaml::from_str(&content).map_err(yaml_error)?;
        if !value.is_null() {
            let raw: RawInstallerConfig = serde_yaml::from_value(value).map_err(yaml_error)?;
            config.update_allow_list = raw.update_allow_list.unwrap_or_default();
        }

        Ok(config)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn filepath(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }

    pub fn update_allow_list(&self) -> &[String] {
        &self.update_allow_list
    }

    /// `AllowList` when the allow-list is non-empty, `Preserve` otherwise.
    pub fn merge_policy(&self) -> MergePolicy {
        MergePolicy::from_allow_list(self.update_allow_list.iter().cloned())
    }
}
