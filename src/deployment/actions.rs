use super::{Deployable, DeploymentError, DeploymentFolder, DeploymentOptions, DeploymentResult};
use crate::fs as fs_util;
use serde::Serialize;
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub source: PathBuf,
    /// `None` deploys in place.
    pub target: Option<PathBuf>,
    /// Replace what a previous deployment left in a non-empty target.
    pub overwrite: bool,
    pub options: DeploymentOptions,
}

impl DeployRequest {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: None,
            overwrite: false,
            options: DeploymentOptions::default(),
        }
    }

    pub fn with_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_options(mut self, options: DeploymentOptions) -> Self {
        self.options = options;
        self
    }
}

/// What a deployment produced.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DeployReport {
    pub target: PathBuf,
    pub in_place: bool,
    pub single_server: bool,
    pub servers: Vec<String>,
    pub generated_files: Vec<PathBuf>,
}

/// Deploys `request.source` into its target, or in place when both are the same directory.
#[instrument(skip(request), fields(source = %request.source.display()))]
pub fn deploy(request: &DeployRequest) -> DeploymentResult<DeployReport> {
    let source = canonicalize(&request.source)?;
    let target = match &request.target {
        Some(target) => resolve_path(target)?,
        None => source.clone(),
    };
    let in_place = target == source;

    let folder = DeploymentFolder::new(&source, request.options.clone())?;

    if in_place {
        deploy_in_place(&folder)?;
    } else {
        deploy_to_target(&folder, &target, request.overwrite)?;
    }

    let report = DeployReport {
        target,
        in_place,
        single_server: folder.is_single_server(),
        servers: folder.server_folders().keys().cloned().collect(),
        generated_files: folder.generated_files().into_iter().collect(),
    };
    info!(
        "Deployed {} server(s) to {}",
        report.servers.len(),
        report.target.display()
    );
    Ok(report)
}

/// Removes the files a deployment generated in `directory`, returning the removed paths
/// relative to it.
#[instrument(skip(directory, options), fields(directory = %directory.as_ref().display()))]
pub fn clean(
    directory: impl AsRef<Path>,
    options: &DeploymentOptions,
) -> DeploymentResult<Vec<PathBuf>> {
    let directory = canonicalize(directory.as_ref())?;
    let folder = DeploymentFolder::new(&directory, options.clone())?;

    let removed: Vec<PathBuf> = folder
        .generated_files()
        .into_iter()
        .filter(|file| directory.join(file).is_file())
        .collect();
    folder.clean_generated_files(&directory)?;

    info!("Removed {} generated file(s)", removed.len());
    Ok(removed)
}

/// Deploys into a staging directory, then swaps the generated files of `folder` with the
/// staged ones. Files the deployment does not own are left alone.
fn deploy_in_place(folder: &DeploymentFolder) -> DeploymentResult<()> {
    let source = folder.directory();
    let staging = tempfile::Builder::new()
        .prefix("cytodeploy-")
        .tempdir()
        .map_err(|e| DeploymentError::io(std::env::temp_dir(), e))?;
    debug!("Staging in-place deployment in {}", staging.path().display());

    folder.deploy_files(staging.path())?;
    folder.clean_generated_files(source)?;

    let mut copied = folder.generated_files();
    copied.insert(PathBuf::from(folder.merged_config().filename()));
    for file in copied {
        let staged = staging.path().join(&file);
        let destination = source.join(&file);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| DeploymentError::io(parent, e))?;
        }
        fs::copy(&staged, &destination).map_err(|e| DeploymentError::io(&destination, e))?;
        debug!("Updated {}", destination.display());
    }

    Ok(())
}

fn deploy_to_target(
    folder: &DeploymentFolder,
    target: &Path,
    overwrite: bool,
) -> DeploymentResult<()> {
    let source = folder.directory();
    if target.starts_with(source) || source.starts_with(target) {
        return Err(DeploymentError::invalid_target(format!(
            "{} and {} overlap",
            target.display(),
            source.display()
        )));
    }

    if target.exists() {
        if !target.is_dir() {
            return Err(DeploymentError::invalid_target(format!(
                "{} is not a directory",
                target.display()
            )));
        }
        let is_empty = fs_util::is_empty_dir(target).map_err(|e| DeploymentError::io(target, e))?;
        if !is_empty {
            if !overwrite {
                return Err(DeploymentError::invalid_target(format!(
                    "{} is not empty (use overwrite to replace a previous deployment)",
                    target.display()
                )));
            }
            remove_deployed_entries(folder, target)?;
        }
    } else {
        fs::create_dir_all(target).map_err(|e| DeploymentError::io(target, e))?;
    }

    folder.deploy_files(target)?;
    Ok(())
}

/// Removes the top-level entries of `target` that a deployment of `folder` writes.
fn remove_deployed_entries(folder: &DeploymentFolder, target: &Path) -> DeploymentResult<()> {
    let entries: BTreeSet<OsString> = folder
        .target_files()?
        .iter()
        .filter_map(|file| match file.components().next() {
            Some(Component::Normal(name)) => Some(name.to_os_string()),
            _ => None,
        })
        .collect();

    for entry in entries {
        let path = target.join(&entry);
        let metadata = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            Err(_) => continue,
        };
        let result = if metadata.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|e| DeploymentError::io(&path, e))?;
        debug!("Removed previous {}", path.display());
    }
    Ok(())
}

fn canonicalize(path: &Path) -> DeploymentResult<PathBuf> {
    fs::canonicalize(path).map_err(|e| DeploymentError::io(path, e))
}

/// Absolute form of a path that may not exist yet, canonicalizing its closest existing
/// ancestor.
fn resolve_path(path: &Path) -> DeploymentResult<PathBuf> {
    if path.exists() {
        return canonicalize(path);
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            Ok(resolve_path(parent)?.join(name))
        }
        _ => {
            let cwd = std::env::current_dir().map_err(|e| DeploymentError::io(path, e))?;
            Ok(cwd.join(path))
        }
    }
}
