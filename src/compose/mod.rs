pub mod errors;
pub mod file;
pub mod override_file;

pub use errors::{ComposeError, ComposeResult};
pub use file::ComposeFile;
pub use override_file::OverrideFile;

pub const DOCKER_COMPOSE_FILENAME: &str = "docker-compose.yml";
pub const DOCKER_COMPOSE_OVERRIDE_FILENAME: &str = "docker-compose.override.yml";
