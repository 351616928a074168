use super::{
    Deployable, DeploymentError, DeploymentResult, FileSet, FolderLayout, ServerFolder,
    DEFAULT_SERVER_NAME, TEMPLATE_CONFIG_FILENAME, WORKING_CONFIG_FILENAME,
};
use crate::compose::DOCKER_COMPOSE_FILENAME;
use crate::config::{ConfigFile, InstallerConfig, MergePolicy, INSTALLER_CONFIG_FILENAME};
use crate::fs as fs_util;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Filenames and layout used when reading an install folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentOptions {
    pub working_config_filename: String,
    pub template_config_filename: String,
    pub installer_config_filename: String,
    pub layout: FolderLayout,
    /// Root subdirectories that are never treated as server folders.
    pub ignored_dirs: BTreeSet<String>,
}

impl Default for DeploymentOptions {
    fn default() -> Self {
        Self {
            working_config_filename: WORKING_CONFIG_FILENAME.to_string(),
            template_config_filename: TEMPLATE_CONFIG_FILENAME.to_string(),
            installer_config_filename: INSTALLER_CONFIG_FILENAME.to_string(),
            layout: FolderLayout::default(),
            ignored_dirs: BTreeSet::new(),
        }
    }
}

/// The root of an installation: merged configuration plus one or more server folders.
///
/// A `docker-compose.yml` at the root means single-server mode, with one server named
/// `default` rooted at the directory itself. Otherwise every subdirectory is a server.
#[derive(Debug)]
pub struct DeploymentFolder {
    directory: PathBuf,
    options: DeploymentOptions,
    installer_config: InstallerConfig,
    merge_policy: MergePolicy,
    merged_config: Arc<ConfigFile>,
    single_server: bool,
    server_folders: BTreeMap<String, ServerFolder>,
}

impl DeploymentFolder {
    /// Reads `directory`, loading the installer config from the folder itself.
    pub fn new(directory: impl Into<PathBuf>, options: DeploymentOptions) -> DeploymentResult<Self> {
        let directory = directory.into();
        let installer_config =
            InstallerConfig::load(&directory, &options.installer_config_filename)?;
        Self::with_installer_config(directory, options, installer_config)
    }

    fn with_installer_config(
        directory: impl Into<PathBuf>,
        options: DeploymentOptions,
        installer_config: InstallerConfig,
    ) -> DeploymentResult<Self> {
        let directory = directory.into();
        if !directory.is_dir() {
            return Err(DeploymentError::io(
                &directory,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }

        let working = ConfigFile::load(&directory, &options.working_config_filename)?;
        let template = ConfigFile::load(&directory, &options.template_config_filename)?;
        if !working.exists() && !template.exists() {
            return Err(DeploymentError::MissingConfig {
                working: working.filepath(),
                template: template.filepath(),
            });
        }

        let merge_policy = installer_config.merge_policy();
        let merged_config = Arc::new(ConfigFile::merge(&working, &template, &merge_policy));

        let subdirs = list_subdirectories(&directory, &options.ignored_dirs)?;
        let single_server = directory.join(DOCKER_COMPOSE_FILENAME).is_file();
        let declared: BTreeSet<&str> = merged_config.servers().collect();

        let mut server_folders = BTreeMap::new();
        if single_server {
            if declared.len() > 1 {
                return Err(DeploymentError::invalid_server_configuration(format!(
                    "{} found at the root of {} (single-server) but the configuration declares {} servers",
                    DOCKER_COMPOSE_FILENAME,
                    directory.display(),
                    declared.len()
                )));
            }
            if let Some(name) = declared.iter().find(|name| **name != DEFAULT_SERVER_NAME) {
                warn!(
                    "Single-server folder declares server '{}'; only '{}' is used",
                    name, DEFAULT_SERVER_NAME
                );
            }

            let folder = ServerFolder::new(
                DEFAULT_SERVER_NAME,
                &directory,
                Arc::clone(&merged_config),
                options.layout.clone(),
            )?;
            server_folders.insert(DEFAULT_SERVER_NAME.to_string(), folder);
        } else {
            if subdirs.is_empty() {
                return Err(DeploymentError::invalid_server_configuration(format!(
                    "no {} at the root of {} and no server folder found",
                    DOCKER_COMPOSE_FILENAME,
                    directory.display()
                )));
            }

            let missing: Vec<&str> = declared
                .iter()
                .filter(|name| !subdirs.contains(**name))
                .copied()
                .collect();
            if !missing.is_empty() {
                return Err(DeploymentError::invalid_server_configuration(format!(
                    "multi-server folder {} has no folder for declared server(s): {}",
                    directory.display(),
                    missing.join(", ")
                )));
            }

            for name in &subdirs {
                let folder = ServerFolder::new(
                    name.as_str(),
                    directory.join(name),
                    Arc::clone(&merged_config),
                    options.layout.clone(),
                )?;
                server_folders.insert(name.clone(), folder);
            }
        }

        info!(
            "Loaded {} ({}, {} server(s))",
            directory.display(),
            if single_server {
                "single-server"
            } else {
                "multi-server"
            },
            server_folders.len()
        );

        Ok(Self {
            directory,
            options,
            installer_config,
            merge_policy,
            merged_config,
            single_server,
            server_folders,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn is_single_server(&self) -> bool {
        self.single_server
    }

    pub fn server_folders(&self) -> &BTreeMap<String, ServerFolder> {
        &self.server_folders
    }

    pub fn merged_config(&self) -> &ConfigFile {
        &self.merged_config
    }

    pub fn merge_policy(&self) -> &MergePolicy {
        &self.merge_policy
    }

    fn template_config_path(&self) -> PathBuf {
        self.directory.join(&self.options.template_config_filename)
    }

    /// Where a server lands inside `target_directory`.
    fn server_target_directory(&self, target_directory: &Path, server_name: &str) -> PathBuf {
        if self.single_server {
            target_directory.to_path_buf()
        } else {
            target_directory.join(server_name)
        }
    }

    /// Re-expresses a server-relative path relative to the root.
    fn server_relative(&self, server_name: &str, file: PathBuf) -> PathBuf {
        if self.single_server {
            file
        } else {
            Path::new(server_name).join(file)
        }
    }

    /// Config files copied verbatim when present at the root.
    fn verbatim_files(&self) -> Vec<(PathBuf, &str)> {
        [
            (
                self.template_config_path(),
                self.options.template_config_filename.as_str(),
            ),
            (
                self.installer_config.filepath(),
                self.installer_config.filename(),
            ),
        ]
        .into_iter()
        .filter(|(path, _)| path.is_file())
        .collect()
    }
}

impl Deployable for DeploymentFolder {
    fn source_files(&self) -> DeploymentResult<FileSet> {
        let mut files = FileSet::new();
        files.insert(PathBuf::from(self.merged_config.filename()));
        files.extend(
            self.verbatim_files()
                .into_iter()
                .map(|(_, filename)| PathBuf::from(filename)),
        );

        for (name, folder) in &self.server_folders {
            for file in folder.source_files()? {
                files.insert(self.server_relative(name, file));
            }
        }
        Ok(files)
    }

    fn generated_files(&self) -> FileSet {
        self.server_folders
            .iter()
            .flat_map(|(name, folder)| {
                folder
                    .generated_files()
                    .into_iter()
                    .map(move |file| self.server_relative(name, file))
            })
            .collect()
    }

    fn deploy_files(&self, target_directory: &Path) -> DeploymentResult<PathBuf> {
        let config_path = self.merged_config.write_to(target_directory)?;
        debug!("Wrote merged configuration to {}", config_path.display());

        for (source, filename) in self.verbatim_files() {
            let destination = target_directory.join(filename);
            fs_util::copy_file(&source, &destination)
                .map_err(|e| DeploymentError::io(&destination, e))?;
        }

        for (name, folder) in &self.server_folders {
            let server_target = self.server_target_directory(target_directory, name);
            if !self.single_server {
                fs::create_dir_all(&server_target)
                    .map_err(|e| DeploymentError::io(&server_target, e))?;
            }
            folder.deploy_files(&server_target)?;
            info!("Deployed server '{}' to {}", name, server_target.display());
        }

        Ok(target_directory.to_path_buf())
    }

    fn clean_generated_files(&self, target_directory: &Path) -> DeploymentResult<()> {
        for (name, folder) in &self.server_folders {
            let server_target = self.server_target_directory(target_directory, name);
            if server_target.is_dir() {
                folder.clean_generated_files(&server_target)?;
            }
        }
        Ok(())
    }
}

/// Sorted names of the subdirectories of `directory`, minus `ignored`.
fn list_subdirectories(
    directory: &Path,
    ignored: &BTreeSet<String>,
) -> DeploymentResult<BTreeSet<String>> {
    let entries = fs::read_dir(directory).map_err(|e| DeploymentError::io(directory, e))?;
    let mut subdirs = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| DeploymentError::io(directory, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| DeploymentError::io(entry.path(), e))?;
        if !file_type.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !ignored.contains(&name) {
            subdirs.insert(name);
        }
    }
    Ok(subdirs)
}
