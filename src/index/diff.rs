// src/index/diff.rs

//! Pure classification of a [`Snapshot`] against the stored records.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::scan::Snapshot;
use super::{Change, FileRecord};
use crate::types::ChangeKind;

/// The state a reconcile would commit, plus what changed to get there.
#[derive(Debug, Clone, Default)]
pub struct Reconciled {
    pub files: BTreeMap<PathBuf, FileRecord>,
    pub changes: Vec<Change>,
}

/// Classify every path of `snapshot` against `previous`.
///
/// Added and modified paths come first, in snapshot order; deleted paths
/// follow in ascending path order. Any mtime difference counts as a
/// modification, including one that goes backwards.
pub fn diff(previous: &BTreeMap<PathBuf, FileRecord>, snapshot: &Snapshot) -> Reconciled {
    let mut files = BTreeMap::new();
    let mut changes = Vec::new();

    for (path, modified) in &snapshot.entries {
        let kind = match previous.get(path) {
            None => Some(ChangeKind::Added),
            Some(record) if record.modified != *modified => Some(ChangeKind::Modified),
            Some(_) => None,
        };
        if let Some(kind) = kind {
            changes.push(Change::new(path.clone(), kind));
        }
        files.insert(
            path.clone(),
            FileRecord {
                path: path.clone(),
                modified: *modified,
            },
        );
    }

    for (path, record) in previous {
        if files.contains_key(path) {
            continue;
        }
        if snapshot.is_shadowed(path) {
            files.insert(path.clone(), record.clone());
        } else {
            changes.push(Change::new(path.clone(), ChangeKind::Deleted));
        }
    }

    Reconciled { files, changes }
}
