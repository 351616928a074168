//! Filesystem helpers shared by the deployment model.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const DOTENV_FILENAME: &str = ".env";

/// Lists every file under `directory` as paths relative to it, sorted.
///
/// A missing directory yields an empty list.
pub fn list_relative_files(directory: impl AsRef<Path>) -> io::Result<Vec<PathBuf>> {
    let directory = directory.as_ref();
    let mut files = Vec::new();
    if directory.is_dir() {
        collect_files(directory, directory, &mut files)?;
    }
    files.sort();
    Ok(files)
}

fn collect_files(root: &Path, current: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(current)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files(root, &path, files)?;
        } else {
            let relative = path
                .strip_prefix(root)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            files.push(relative.to_path_buf());
        }
    }
    Ok(())
}

/// Writes `KEY=VALUE` lines to `directory/filename` and returns the written path.
pub fn write_dotenv<'a, I>(
    directory: impl AsRef<Path>,
    vars: I,
    filename: &str,
) -> io::Result<PathBuf>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let path = directory.as_ref().join(filename);
    let mut content = String::new();
    for (key, value) in vars {
        content.push_str(key);
        content.push('=');
        content.push_str(value);
        content.push('\n');
    }

    let mut file = fs::File::create(&path)?;
    file.write_all(content.as_bytes())?;
    Ok(path)
}

/// Copies a single file. Copying a file onto itself is a no-op instead of truncating it.
pub fn copy_file(source: impl AsRef<Path>, destination: impl AsRef<Path>) -> io::Result<()> {
    let source = source.as_ref();
    let destination = destination.as_ref();
    if destination.exists() && fs::canonicalize(source)? == fs::canonicalize(destination)? {
        return Ok(());
    }
    fs::copy(source, destination)?;
    Ok(())
}

/// Recursively copies `source` into `destination`, which must not exist yet.
pub fn copy_tree(source: impl AsRef<Path>, destination: impl AsRef<Path>) -> io::Result<()> {
    let source = source.as_ref();
    let destination = destination.as_ref();

    fs::create_dir(destination)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let target = destination.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Removes `directory` and its ancestors while they are empty, never touching `root`
/// or anything outside it.
pub fn remove_empty_dirs(directory: impl AsRef<Path>, root: impl AsRef<Path>) {
    let root = root.as_ref();
    let mut current = directory.as_ref();

    while current != root && current.starts_with(root) {
        if fs::remove_dir(current).is_err() {
            // Not empty (or already gone); ancestors cannot be empty either.
            break;
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
}

pub fn is_empty_dir(directory: impl AsRef<Path>) -> io::Result<bool> {
    Ok(fs::read_dir(directory)?.next().is_none())
}
