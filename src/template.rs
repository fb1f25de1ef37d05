//! The template store: capturing, locating, listing and deleting stored
//! templates under the templates root.

use crate::error::{Error, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Default directory name for the templates root under the home directory.
const DEFAULT_STORE_DIR: &str = ".tmpl";

/// Resolves the templates root: the custom directory when given, otherwise
/// `$HOME/.tmpl`.
pub fn templates_root(custom_dir: Option<PathBuf>) -> PathBuf {
    custom_dir.unwrap_or_else(|| {
        dirs::home_dir().unwrap_or_default().join(DEFAULT_STORE_DIR)
    })
}

/// Locates a stored template by name.
///
/// # Errors
/// * [`Error::TemplateNotFound`] when no such template exists
pub fn find(root: &Path, name: &str) -> Result<PathBuf> {
    let path = root.join(name);
    if !path.exists() {
        return Err(Error::TemplateNotFound { name: name.to_string() });
    }
    Ok(path)
}

/// Captures a new template by copying `sources` under `root/name`.
///
/// When `name` is `None` the file name of the first source is used and a
/// warning says so. With `remove_sources` the sources are deleted after a
/// successful copy. Returns the template's name.
pub fn capture(
    root: &Path,
    name: Option<String>,
    sources: &[PathBuf],
    remove_sources: bool,
) -> Result<String> {
    let first = sources
        .first()
        .ok_or_else(|| Error::Walk("no source files given".to_string()))?;
    let name = match name {
        Some(name) => name,
        None => {
            let derived = first
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "template".to_string());
            warn!("Name is not specified, using {}", derived);
            derived
        }
    };

    let target = root.join(&name);
    for source in sources {
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "template".to_string());
        copy_tree(source, &target.join(file_name))?;
    }

    if remove_sources {
        for source in sources {
            remove_tree(source)?;
        }
    }

    Ok(name)
}

/// Deletes the stored template `name`.
pub fn delete(root: &Path, name: &str) -> Result<()> {
    let path = find(root, name)?;
    remove_tree(&path)
}

/// Lists the names of all stored templates, sorted.
pub fn list(root: &Path) -> Result<Vec<String>> {
    if !root.exists() {
        return Ok(Vec::new());
    }
    let mut names: Vec<String> = fs::read_dir(root)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    Ok(names)
}

/// Recursively copies a file or directory tree.
fn copy_tree(source: &Path, target: &Path) -> Result<()> {
    if source.is_dir() {
        fs::create_dir_all(target)?;
        for entry in fs::read_dir(source)? {
            let entry = entry?;
            copy_tree(&entry.path(), &target.join(entry.file_name()))?;
        }
    } else {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!("Copying '{}'", source.display());
        fs::copy(source, target)?;
    }
    Ok(())
}

fn remove_tree(path: &Path) -> Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}
