use super::errors::{ComposeError, ComposeResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
struct ServiceOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    env_file: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    volumes: Vec<String>,
}

/// An editable `docker-compose.override.yml`.
///
/// No `version` key is ever written, compose file versioning is deprecated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverrideFile {
    services: BTreeMap<String, ServiceOverride>,
}

impl OverrideFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_service_env_file(&mut self, service: &str, env_file: impl Into<String>) {
        self.service_mut(service).env_file = Some(env_file.into());
    }

    /// Adds a `source:target` volume specification to a service.
    pub fn add_service_volume(&mut self, service: &str, volume: impl Into<String>) {
        self.service_mut(service).volumes.push(volume.into());
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn to_yaml_string(&self) -> ComposeResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn write_to(&self, directory: impl AsRef<Path>, filename: &str) -> ComposeResult<PathBuf> {
        let path = directory.as_ref().join(filename);
        let content = self.to_yaml_string()?;
        fs::write(&path, content).map_err(|e| ComposeError::io(&path, e))?;
        Ok(path)
    }

    fn service_mut(&mut self, service: &str) -> &mut ServiceOverride {
        self.services.entry(service.to_string()).or_default()
    }
}
