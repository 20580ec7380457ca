use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::Result;

/// A discovered notebook file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Path relative to the catalogue root directory.
    pub relative_path: PathBuf,
    /// Fully resolved absolute path.
    pub absolute_path: PathBuf,
}

/// File extension of notebooks.
const NOTEBOOK_EXTENSION: &str = "ipynb";

/// Directory names never descended into, besides hidden ones.
const EXCLUDED_DIRS: &[&str] = &["node_modules", "__pycache__", "gists-website"];

/// User-supplied exclude globs, matched against paths relative to the root.
#[derive(Debug, Clone)]
pub struct Exclusions {
    set: GlobSet,
}

impl Exclusions {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern.as_ref())?);
        }
        Ok(Self {
            set: builder.build()?,
        })
    }

    pub fn none() -> Self {
        Self {
            set: GlobSet::empty(),
        }
    }

    fn is_excluded(&self, relative_path: &Path) -> bool {
        self.set.is_match(relative_path)
    }
}

impl Default for Exclusions {
    fn default() -> Self {
        Self::none()
    }
}

/// Recursively walk a directory and discover notebooks.
///
/// Skips hidden files/directories (names starting with `.`, which covers
/// `.git`, `.venv` and `.ipynb_checkpoints`), the directories in
/// [`EXCLUDED_DIRS`] and anything matching `exclusions`. Only `.ipynb`
/// files are returned, sorted by relative path.
pub fn discover_notebooks(
    root: &Path,
    exclusions: &Exclusions,
) -> Result<Vec<DiscoveredFile>> {
    let canonical_root = root.canonicalize()?;
    let mut results = Vec::new();
    walk_dir(&canonical_root, &canonical_root, exclusions, &mut results)?;
    results.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    tracing::debug!(
        root = %canonical_root.display(),
        notebooks = results.len(),
        "discovered notebooks"
    );
    Ok(results)
}

fn walk_dir(
    root: &Path,
    current: &Path,
    exclusions: &Exclusions,
    results: &mut Vec<DiscoveredFile>,
) -> Result<()> {
    let entries = std::fs::read_dir(current)?;

    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();

        // Skip hidden files and directories.
        if name.starts_with('.') {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(&path);
        if exclusions.is_excluded(relative) {
            continue;
        }

        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            if EXCLUDED_DIRS.contains(&&*name) {
                continue;
            }
            walk_dir(root, &path, exclusions, results)?;
        } else if file_type.is_symlink() {
            let resolved = match path.canonicalize() {
                Ok(p) => p,
                Err(_) => continue, // Skip broken symlinks
            };
            if resolved.is_file() && is_notebook(&resolved) {
                results.push(make_discovered(root, &path, &resolved));
            }
        } else if file_type.is_file() && is_notebook(&path) {
            let abs = path.canonicalize()?;
            results.push(make_discovered(root, &path, &abs));
        }
    }

    Ok(())
}

fn is_notebook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == NOTEBOOK_EXTENSION)
}

fn make_discovered(
    root: &Path,
    original_path: &Path,
    absolute_path: &Path,
) -> DiscoveredFile {
    let relative_path = original_path
        .strip_prefix(root)
        .unwrap_or(original_path)
        .to_path_buf();

    DiscoveredFile {
        relative_path,
        absolute_path: absolute_path.to_path_buf(),
    }
}
