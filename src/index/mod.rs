// src/index/mod.rs

//! In-memory index of tracked files and their last observed mtimes.
//!
//! - [`scan`] traverses the roots into a staging [`Snapshot`].
//! - [`diff`] classifies a snapshot against the stored records.
//! - [`FileIndex`] commits the result, so a failed traversal never leaves a
//!   half-updated index behind.

pub mod diff;
pub mod scan;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::errors::Result;
use crate::types::ChangeKind;

pub use diff::{diff, Reconciled};
pub use scan::{Scanner, Snapshot};

/// One tracked file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// A path reported by a reconciliation cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Change {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl Change {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Mapping from path to its last observed [`FileRecord`].
///
/// At most one record exists per path. Directories are never recorded.
#[derive(Debug, Clone, Default)]
pub struct FileIndex {
    files: BTreeMap<PathBuf, FileRecord>,
}

impl FileIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full scan: insert or overwrite a record for every matching file.
    ///
    /// Records for paths that no longer exist are left alone; use
    /// [`FileIndex::reconcile`] to detect those. On error the index is
    /// unchanged.
    pub fn build(&mut self, scanner: &Scanner<'_>, roots: &[PathBuf]) -> Result<()> {
        let snapshot = scanner.scan(roots)?;
        for (path, modified) in snapshot.entries {
            self.files.insert(
                path.clone(),
                FileRecord { path, modified },
            );
        }
        debug!(tracked = self.files.len(), "baseline scan complete");
        Ok(())
    }

    /// Re-traverse `roots` and return every added, modified and deleted path.
    ///
    /// The new state is computed completely before it replaces the current
    /// one; if the traversal fails the index is exactly as it was before the
    /// call.
    pub fn reconcile(&mut self, scanner: &Scanner<'_>, roots: &[PathBuf]) -> Result<Vec<Change>> {
        let snapshot = scanner.scan(roots)?;
        let Reconciled { files, changes } = diff(&self.files, &snapshot);

        for change in &changes {
            debug!(path = ?change.path, kind = %change.kind, "detected change");
        }

        self.files = files;
        Ok(changes)
    }

    pub fn get(&self, path: &Path) -> Option<&FileRecord> {
        self.files.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Records in ascending path order.
    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.values()
    }
}
