use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("No docker-compose file found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid docker compose file at {}: {details}", .path.display())]
    InvalidComposeFile { path: PathBuf, details: String },

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("IO error on {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ComposeError {
    pub fn invalid_compose_file(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        ComposeError::InvalidComposeFile {
            path: path.into(),
            details: details.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ComposeError::IoError {
            path: path.into(),
            source,
        }
    }
}

pub type ComposeResult<T> = Result<T, ComposeError>;
