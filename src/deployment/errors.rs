use crate::compose::ComposeError;
use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeploymentError {
    #[error("either {} or {} should exist, none found", .working.display(), .template.display())]
    MissingConfig { working: PathBuf, template: PathBuf },

    #[error("Invalid server configuration: {0}")]
    InvalidServerConfiguration(String),

    #[error("No docker-compose file found at {}", .0.display())]
    NoDockerCompose(PathBuf),

    #[error("Invalid target directory: {0}")]
    InvalidTargetDirectory(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Docker compose error: {0}")]
    Compose(ComposeError),

    #[error("Filesystem error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl DeploymentError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DeploymentError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_server_configuration(msg: impl Into<String>) -> Self {
        DeploymentError::InvalidServerConfiguration(msg.into())
    }

    pub fn invalid_target(msg: impl Into<String>) -> Self {
        DeploymentError::InvalidTargetDirectory(msg.into())
    }

    /// True for errors caused by the content of the source tree rather than by the
    /// filesystem or the target directory.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            DeploymentError::MissingConfig { .. }
            | DeploymentError::InvalidServerConfiguration(_)
            | DeploymentError::NoDockerCompose(_) => true,
            DeploymentError::Config(err) => !matches!(
                err,
                ConfigError::Read { .. } | ConfigError::Write { .. }
            ),
            DeploymentError::Compose(err) => !matches!(err, ComposeError::IoError { .. }),
            DeploymentError::InvalidTargetDirectory(_) | DeploymentError::Io { .. } => false,
        }
    }
}

impl From<ComposeError> for DeploymentError {
    fn from(err: ComposeError) -> Self {
        match err {
            ComposeError::NotFound(path) => DeploymentError::NoDockerCompose(path),
            other => DeploymentError::Compose(other),
        }
    }
}

pub type DeploymentResult<T> = Result<T, DeploymentError>;
