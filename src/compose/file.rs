use super::errors::{ComposeError, ComposeResult};
use super::DOCKER_COMPOSE_FILENAME;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Read-only view of a server's `docker-compose.yml`.
#[derive(Debug, Clone)]
pub struct ComposeFile {
    filepath: PathBuf,
    services: Vec<String>,
}

impl ComposeFile {
    /// Reads `docker-compose.yml` from `directory`.
    pub fn from_directory(directory: impl AsRef<Path>) -> ComposeResult<Self> {
        let filepath = directory.as_ref().join(DOCKER_COMPOSE_FILENAME);
        if !filepath.is_file() {
            return Err(ComposeError::NotFound(filepath));
        }

        let content = fs::read_to_string(&filepath).map_err(|e| ComposeError::io(&filepath, e))?;
        let services = Self::parse_services(&filepath, &content)?;

        Ok(Self { filepath, services })
    }

    /// Extracts the top-level service names, in document order.
    pub fn parse_services(path: &Path, content: &str) -> ComposeResult<Vec<String>> {
        let yaml: Value = serde_yaml::from_str(content)?;

        let mapping = yaml.as_mapping().ok_or_else(|| {
            ComposeError::invalid_compose_file(path, "Docker Compose file must be a YAML mapping")
        })?;

        let services = match mapping.get("services") {
            Some(Value::Mapping(services)) => services,
            Some(Value::Null) => return Ok(Vec::new()),
            Some(_) => {
                return Err(ComposeError::invalid_compose_file(
                    path,
                    "Services must be a YAML mapping",
                ))
            }
            None => {
                return Err(ComposeError::invalid_compose_file(
                    path,
                    "No services found in compose file",
                ))
            }
        };

        services
            .keys()
            .map(|name| {
                name.as_str().map(str::to_string).ok_or_else(|| {
                    ComposeError::invalid_compose_file(path, "Service name must be a string")
                })
            })
            .collect()
    }

    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    pub fn filename(&self) -> &str {
        DOCKER_COMPOSE_FILENAME
    }

    pub fn services(&self) -> &[String] {
        &self.services
    }
}
