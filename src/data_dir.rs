use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// File name of the input artifact produced by notebook conversion.
pub const METADATA_FILE: &str = "notebooks-metadata.json";

/// File name of the navigation tree artifact.
pub const NAVIGATION_FILE: &str = "navigation.json";

/// File name of the search documents artifact.
pub const SEARCH_INDEX_FILE: &str = "search-index.json";

#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Resolve the data directory from, in order of priority:
    /// 1. An explicit path (from --data-dir)
    /// 2. The GISTBOOK_DATA_DIR environment variable
    /// 3. The XDG data directory (~/.local/share/gistbook/)
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let root = if let Some(path) = explicit {
            path.to_path_buf()
        } else if let Ok(val) = std::env::var("GISTBOOK_DATA_DIR") {
            PathBuf::from(val)
        } else {
            xdg::BaseDirectories::with_prefix("gistbook")
                .get_data_home()
                .ok_or_else(|| {
                    Error::Config(
                        "could not determine XDG data home directory".into(),
                    )
                })?
        };

        std::fs::create_dir_all(&root)
            .map_err(|_| Error::DataDir(root.clone()))?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metadata_file(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }

    pub fn navigation_file(&self) -> PathBuf {
        self.root.join(NAVIGATION_FILE)
    }

    pub fn search_index_file(&self) -> PathBuf {
        self.root.join(SEARCH_INDEX_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_with_explicit_path() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = DataDir::resolve(Some(tmp.path())).unwrap();

        assert_eq!(dir.root(), tmp.path());
        assert_eq!(
            dir.metadata_file(),
            tmp.path().join("notebooks-metadata.json")
        );
        assert_eq!(dir.navigation_file(), tmp.path().join("navigation.json"));
        assert_eq!(
            dir.search_index_file(),
            tmp.path().join("search-index.json")
        );
    }

    #[test]
    fn resolve_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("data").join("site");
        let dir = DataDir::resolve(Some(&nested)).unwrap();

        assert!(nested.is_dir());
        assert_eq!(dir.root(), nested);
    }
}
