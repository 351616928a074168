pub mod auto;
pub mod config_file;
pub mod env_store;
pub mod errors;
pub mod installer;

pub use config_file::ConfigFile;
pub use env_store::{EnvScope, EnvStore, EnvVars, MergePolicy};
pub use errors::{ConfigError, ConfigResult};
pub use installer::{InstallerConfig, INSTALLER_CONFIG_FILENAME};
