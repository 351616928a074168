pub mod actions;
pub mod deployment_folder;
pub mod errors;
pub mod server_folder;

pub use actions::{clean, deploy, DeployReport, DeployRequest};
pub use deployment_folder::{DeploymentFolder, DeploymentOptions};
pub use errors::{DeploymentError, DeploymentResult};
pub use server_folder::ServerFolder;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Relative file paths, ordered for deterministic output.
pub type FileSet = BTreeSet<PathBuf>;

pub const WORKING_CONFIG_FILENAME: &str = "cytomine.yml";
pub const TEMPLATE_CONFIG_FILENAME: &str = "cytomine.template";
pub const DEFAULT_SERVER_NAME: &str = "default";

/// A unit of the source tree that can be materialized into a target directory.
///
/// All file sets are relative to the unit's own directory. `source_files` and
/// `generated_files` never overlap, and `clean_generated_files` undoes exactly the
/// generated half of `deploy_files`.
pub trait Deployable {
    /// Files that already exist in the source tree and are copied as-is.
    fn source_files(&self) -> DeploymentResult<FileSet>;

    /// Files produced by `deploy_files`.
    fn generated_files(&self) -> FileSet;

    /// Every file present in a target after `deploy_files`.
    fn target_files(&self) -> DeploymentResult<FileSet> {
        let mut files = self.source_files()?;
        files.extend(self.generated_files());
        Ok(files)
    }

    fn deploy_files(&self, target_directory: &Path) -> DeploymentResult<PathBuf>;

    fn clean_generated_files(&self, target_directory: &Path) -> DeploymentResult<()>;
}

/// Directory names and mount point shared by every server folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderLayout {
    pub configs_folder: String,
    pub envs_folder: String,
    pub configs_mount_point: String,
}

impl Default for FolderLayout {
    fn default() -> Self {
        Self {
            configs_folder: "configs".to_string(),
            envs_folder: "envs".to_string(),
            configs_mount_point: "/cm_configs".to_string(),
        }
    }
}
