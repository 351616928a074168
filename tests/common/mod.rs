#![allow(dead_code)]

use cytodeploy::fs::{copy_tree, list_relative_files};
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Path of a fixture tree under `tests/fixtures/`.
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// A throwaway copy of a fixture, so tests can deploy in place or mutate it.
pub struct Workspace {
    pub temp_dir: TempDir,
    pub source: PathBuf,
}

impl Workspace {
    pub fn from_fixture(name: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("source");
        copy_tree(fixture_path(name), &source).expect("Failed to copy fixture");
        Self { temp_dir, source }
    }

    /// A path inside the workspace that does not exist yet.
    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}

pub fn relative_files(directory: &Path) -> BTreeSet<PathBuf> {
    list_relative_files(directory)
        .expect("Failed to list files")
        .into_iter()
        .collect()
}

pub fn paths(items: &[&str]) -> BTreeSet<PathBuf> {
    items.iter().map(PathBuf::from).collect()
}

pub fn read_yaml(path: &Path) -> Value {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    serde_yaml::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e))
}

pub fn read_dotenv(path: &Path) -> BTreeMap<String, String> {
    fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

pub fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().expect("path has a parent")).expect("Failed to create dir");
    fs::write(path, content).expect("Failed to write file");
}
