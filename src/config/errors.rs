use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write configuration file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML parsing error in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("YAML serialization error: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("Invalid value for '{key}' in {}: {details}", .path.display())]
    InvalidValue {
        path: PathBuf,
        key: String,
        details: String,
    },

    #[error("Unknown value generator '{generator}' for '{key}'")]
    UnknownGenerator { key: String, generator: String },
}

impl ConfigError {
    pub fn invalid_value(
        path: impl Into<PathBuf>,
        key: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidValue {
            path: path.into(),
            key: key.into(),
            details: details.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
