//! Data directory layout.
//!
//! # Invariants
//! - All derived paths are absolute, so logging and export paths stay
//!   valid regardless of later working-directory changes.

use std::io;
use std::path::{Path, PathBuf};

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = ".fairy_data";
pub const DB_FILE_NAME: &str = "fairy.sqlite3";
pub const LOG_DIR_NAME: &str = "logs";
pub const EXPORTS_DIR_NAME: &str = "exports";

/// Resolved on-disk locations for one data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub root: PathBuf,
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub exports_dir: PathBuf,
}

impl StoragePaths {
    /// Derives all paths from `data_dir`, made absolute against the current
    /// working directory. Nothing is created on disk.
    pub fn resolve(data_dir: impl AsRef<Path>) -> io::Result<Self> {
        let root = std::path::absolute(data_dir.as_ref())?;
        Ok(Self {
            db_path: root.join(DB_FILE_NAME),
            log_dir: root.join(LOG_DIR_NAME),
            exports_dir: root.join(EXPORTS_DIR_NAME),
            root,
        })
    }

    /// Creates the data root and export directory if missing.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(&self.exports_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::StoragePaths;

    #[test]
    fn resolve_makes_paths_absolute() {
        let paths = StoragePaths::resolve(".fairy_data").expect("cwd should resolve");
        assert!(paths.root.is_absolute());
        assert!(paths.db_path.ends_with("fairy.sqlite3"));
        assert!(paths.log_dir.starts_with(&paths.root));
        assert!(paths.exports_dir.starts_with(&paths.root));
    }

    #[test]
    fn ensure_dirs_creates_layout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = StoragePaths::resolve(dir.path().join("data")).expect("resolve");
        paths.ensure_dirs().expect("dirs should be created");
        assert!(paths.root.is_dir());
        assert!(paths.exports_dir.is_dir());
    }
}
