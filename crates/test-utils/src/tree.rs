use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tempfile::TempDir;

/// A real directory tree under a temp dir, with explicit mtimes so tests do
/// not depend on the filesystem's timestamp resolution.
#[derive(Debug)]
pub struct TempTree {
    dir: TempDir,
}

impl TempTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("creating temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Create (or overwrite) a file and pin its mtime.
    pub fn write(&self, rel: &str, modified: SystemTime) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("creating parent dirs");
        }
        fs::write(&path, rel.as_bytes()).expect("writing file");
        self.set_mtime(rel, modified);
        path
    }

    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(&path).expect("creating dir");
        path
    }

    pub fn set_mtime(&self, rel: &str, modified: SystemTime) {
        let file = fs::File::options()
            .write(true)
            .open(self.path(rel))
            .expect("opening file for set_modified");
        file.set_modified(modified).expect("setting mtime");
    }

    pub fn remove(&self, rel: &str) {
        let path = self.path(rel);
        if path.is_dir() {
            fs::remove_dir_all(&path).expect("removing dir");
        } else {
            fs::remove_file(&path).expect("removing file");
        }
    }
}

impl Default for TempTree {
    fn default() -> Self {
        Self::new()
    }
}
