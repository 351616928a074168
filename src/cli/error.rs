use crate::deployment::DeploymentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),
}

impl CliError {
    /// Process exit code: 2 for configuration problems, 3 for an unusable target.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::OperationFailed(_) => 1,
            CliError::ConfigError(_) => 2,
            CliError::InvalidTarget(_) => 3,
        }
    }
}

impl From<DeploymentError> for CliError {
    fn from(err: DeploymentError) -> Self {
        match err {
            DeploymentError::InvalidTargetDirectory(msg) => CliError::InvalidTarget(msg),
            err if err.is_configuration_error() => CliError::ConfigError(err.to_string()),
            err => CliError::OperationFailed(err.to_string()),
        }
    }
}
