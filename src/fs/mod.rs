// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

pub mod mock;

/// The subset of entry metadata the index cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMeta {
    pub is_dir: bool,
    pub modified: SystemTime,
}

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    /// Metadata of `path` itself. Symbolic links are not followed.
    fn metadata(&self, path: &Path) -> Result<EntryMeta>;

    /// Return a list of entries in a directory.
    /// Returns full paths.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn metadata(&self, path: &Path) -> Result<EntryMeta> {
        // lstat: a link to a directory is tracked as an entry, never descended.
        let meta = fs::symlink_metadata(path)
            .with_context(|| format!("reading metadata of {:?}", path))?;
        let modified = meta
            .modified()
            .with_context(|| format!("reading mtime of {:?}", path))?;
        Ok(EntryMeta {
            is_dir: meta.is_dir(),
            modified,
        })
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("reading dir {:?}", path))? {
            let entry = entry.with_context(|| format!("reading entry in {:?}", path))?;
            entries.push(entry.path());
        }
        Ok(entries)
    }
}
