use super::{Deployable, DeploymentError, DeploymentResult, FileSet, FolderLayout};
use crate::compose::{ComposeFile, OverrideFile, DOCKER_COMPOSE_OVERRIDE_FILENAME};
use crate::config::{ConfigFile, EnvStore, EnvVars};
use crate::fs::{self as fs_util, DOTENV_FILENAME};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// One server directory: a `docker-compose.yml` plus an optional `configs/` tree.
#[derive(Debug, Clone)]
pub struct ServerFolder {
    server_name: String,
    directory: PathBuf,
    layout: FolderLayout,
    compose_file: ComposeFile,
    envs: Arc<ConfigFile>,
}

impl ServerFolder {
    /// Fails when `directory` has no `docker-compose.yml`.
    pub fn new(
        server_name: impl Into<String>,
        directory: impl Into<PathBuf>,
        envs: Arc<ConfigFile>,
        layout: FolderLayout,
    ) -> DeploymentResult<Self> {
        let directory = directory.into();
        let compose_file = ComposeFile::from_directory(&directory)?;

        Ok(Self {
            server_name: server_name.into(),
            directory,
            layout,
            compose_file,
            envs,
        })
    }

    pub fn configs_path(&self) -> PathBuf {
        self.directory.join(&self.layout.configs_folder)
    }

    pub fn has_config(&self) -> bool {
        self.configs_path().is_dir()
    }

    fn server_store(&self) -> Option<&EnvStore> {
        self.envs.server_store(&self.server_name)
    }

    /// Compose services with a namespace in this server's env store, sorted by name.
    fn services_with_envs(&self) -> Vec<&str> {
        let Some(store) = self.server_store() else {
            return Vec::new();
        };
        let mut services: Vec<&str> = self
            .compose_file
            .services()
            .iter()
            .map(String::as_str)
            .filter(|service| store.has_namespace(service))
            .collect();
        services.sort_unstable();
        services
    }

    fn service_env_filename(service: &str) -> String {
        format!("{}.env", service)
    }

    /// Global namespaces flattened as `NAMESPACE_KEY` variables.
    fn global_dotenv(&self) -> EnvVars {
        let global_envs = self.envs.global_envs();
        let mut vars = EnvVars::new();
        for namespace in global_envs.namespaces() {
            let Some(namespace_envs) = global_envs.get_namespace_envs(namespace) else {
                continue;
            };
            for (key, value) in namespace_envs {
                vars.insert(
                    format!("{}_{}", namespace.to_uppercase(), key.to_uppercase()),
                    value.clone(),
                );
            }
        }
        vars
    }

    fn build_override(&self, target_directory: &Path) -> DeploymentResult<OverrideFile> {
        let mut override_file = OverrideFile::new();

        // The envs folder exists whenever the server has a store entry, even if no
        // compose service matches it.
        if let Some(store) = self.server_store() {
            let target_envs = target_directory.join(&self.layout.envs_folder);
            fs::create_dir_all(&target_envs)
                .map_err(|e| DeploymentError::io(&target_envs, e))?;

            for service in self.services_with_envs() {
                let Some(service_envs) = store.get_namespace_envs(service) else {
                    continue;
                };
                let filename = Self::service_env_filename(service);
                let env_path = fs_util::write_dotenv(&target_envs, service_envs, &filename)
                    .map_err(|e| DeploymentError::io(target_envs.join(&filename), e))?;
                debug!("Wrote {}", env_path.display());
                override_file.set_service_env_file(
                    service,
                    format!("{}/{}", self.layout.envs_folder, filename),
                );
            }
        }

        // One volume per file under configs/<service>.
        let mut services: Vec<&String> = self.compose_file.services().iter().collect();
        services.sort_unstable();
        let mount_point = self.layout.configs_mount_point.trim_end_matches('/');
        for service in services {
            let service_configs = self.configs_path().join(service);
            if !service_configs.is_dir() {
                continue;
            }
            let config_files = fs_util::list_relative_files(&service_configs)
                .map_err(|e| DeploymentError::io(&service_configs, e))?;
            for config_file in config_files {
                let relative = to_slash(&config_file);
                override_file.add_service_volume(
                    service,
                    format!(
                        "./{}/{}/{}:{}/{}",
                        self.layout.configs_folder, service, relative, mount_point, relative
                    ),
                );
            }
        }

        Ok(override_file)
    }
}

impl Deployable for ServerFolder {
    fn source_files(&self) -> DeploymentResult<FileSet> {
        let mut files = FileSet::new();
        files.insert(PathBuf::from(self.compose_file.filename()));

        let configs_path = self.configs_path();
        let config_files = fs_util::list_relative_files(&configs_path)
            .map_err(|e| DeploymentError::io(&configs_path, e))?;
        files.extend(
            config_files
                .into_iter()
                .map(|file| Path::new(&self.layout.configs_folder).join(file)),
        );

        Ok(files)
    }

    fn generated_files(&self) -> FileSet {
        let mut files = FileSet::new();
        files.insert(PathBuf::from(DOTENV_FILENAME));
        files.insert(PathBuf::from(DOCKER_COMPOSE_OVERRIDE_FILENAME));
        files.extend(self.services_with_envs().into_iter().map(|service| {
            Path::new(&self.layout.envs_folder).join(Self::service_env_filename(service))
        }));
        files
    }

    fn deploy_files(&self, target_directory: &Path) -> DeploymentResult<PathBuf> {
        debug!(
            "Deploying server '{}' from {} to {}",
            self.server_name,
            self.directory.display(),
            target_directory.display()
        );

        // Compose file first, then the global .env.
        let compose_target = target_directory.join(self.compose_file.filename());
        fs_util::copy_file(self.compose_file.filepath(), &compose_target)
            .map_err(|e| DeploymentError::io(&compose_target, e))?;

        let global_envs = self.global_dotenv();
        fs_util::write_dotenv(target_directory, &global_envs, DOTENV_FILENAME)
            .map_err(|e| DeploymentError::io(target_directory.join(DOTENV_FILENAME), e))?;

        // Writes envs/<service>.env as a side effect.
        let override_file = self.build_override(target_directory)?;

        // Fails if configs/ already exists in the target.
        if self.has_config() {
            let configs_target = target_directory.join(&self.layout.configs_folder);
            fs_util::copy_tree(self.configs_path(), &configs_target)
                .map_err(|e| DeploymentError::io(&configs_target, e))?;
        }

        override_file.write_to(target_directory, DOCKER_COMPOSE_OVERRIDE_FILENAME)?;

        Ok(target_directory.to_path_buf())
    }

    fn clean_generated_files(&self, target_directory: &Path) -> DeploymentResult<()> {
        for file in self.generated_files() {
            let path = target_directory.join(&file);
            if !path.is_file() {
                continue;
            }
            fs::remove_file(&path).map_err(|e| DeploymentError::io(&path, e))?;
            debug!("Removed {}", path.display());
            if let Some(parent) = path.parent() {
                fs_util::remove_empty_dirs(parent, target_directory);
            }
        }

        // Deploy may leave an empty envs folder behind when no service had envs.
        let envs_path = target_directory.join(&self.layout.envs_folder);
        if envs_path.is_dir()
            && fs_util::is_empty_dir(&envs_path).map_err(|e| DeploymentError::io(&envs_path, e))?
        {
            fs::remove_dir(&envs_path).map_err(|e| DeploymentError::io(&envs_path, e))?;
        }

        Ok(())
    }
}

/// Renders a relative path with `/` separators, as expected in compose files.
fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
