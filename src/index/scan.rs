// src/index/scan.rs

//! Recursive traversal of the watch roots into a staging [`Snapshot`].
//!
//! Nothing here touches a [`FileIndex`](super::FileIndex); the index only
//! commits a snapshot once the traversal has finished without error.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use crate::errors::{PollwatchError, Result, TraversalError};
use crate::fs::FileSystem;
use crate::select::FileSelector;
use crate::types::ErrorPolicy;

/// Result of one full traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Matching files in traversal order, each path at most once.
    pub entries: Vec<(PathBuf, SystemTime)>,
    /// Entries left out under [`ErrorPolicy::Skip`] because they could not
    /// be read. Tracked paths at or below these are kept as they were.
    pub skipped: Vec<PathBuf>,
}

impl Snapshot {
    pub fn is_shadowed(&self, path: &Path) -> bool {
        self.skipped.iter().any(|s| path.starts_with(s))
    }
}

/// Walks roots depth-first, children in lexicographic order.
///
/// Symbolic links are never followed: a link is recorded as a plain entry
/// (subject to the selector) using its own mtime.
pub struct Scanner<'a> {
    fs: &'a dyn FileSystem,
    selector: &'a dyn FileSelector,
    policy: ErrorPolicy,
    cancel: Option<&'a CancellationToken>,
}

impl<'a> Scanner<'a> {
    pub fn new(fs: &'a dyn FileSystem, selector: &'a dyn FileSelector) -> Self {
        Self {
            fs,
            selector,
            policy: ErrorPolicy::default(),
            cancel: None,
        }
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Checked before each root; a cancelled scan yields `PollwatchError::Cancelled`.
    pub fn with_cancel(mut self, cancel: &'a CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn scan(&self, roots: &[PathBuf]) -> Result<Snapshot> {
        let mut snapshot = Snapshot::default();
        let mut seen: HashSet<PathBuf> = HashSet::new();

        for root in roots {
            if self.cancel.is_some_and(|c| c.is_cancelled()) {
                return Err(PollwatchError::Cancelled);
            }
            self.walk(root, &mut seen, &mut snapshot)?;
        }

        Ok(snapshot)
    }

    fn walk(
        &self,
        root: &Path,
        seen: &mut HashSet<PathBuf>,
        snapshot: &mut Snapshot,
    ) -> Result<()> {
        let mut stack = vec![root.to_path_buf()];

        while let Some(path) = stack.pop() {
            let meta = match self.fs.metadata(&path) {
                Ok(meta) => meta,
                Err(err) => {
                    self.on_error(path, err, snapshot)?;
                    continue;
                }
            };

            if meta.is_dir {
                let mut children = match self.fs.read_dir(&path) {
                    Ok(children) => children,
                    Err(err) => {
                        self.on_error(path, err, snapshot)?;
                        continue;
                    }
                };
                trace!(dir = ?path, entries = children.len(), "visiting directory");
                // Reverse order so the stack pops the smallest name first.
                children.sort_unstable_by(|a, b| b.cmp(a));
                stack.extend(children);
            } else if self.selector.matches(&path) && seen.insert(path.clone()) {
                snapshot.entries.push((path, meta.modified));
            }
        }

        Ok(())
    }

    fn on_error(&self, path: PathBuf, err: anyhow::Error, snapshot: &mut Snapshot) -> Result<()> {
        match self.policy {
            ErrorPolicy::Abort => Err(TraversalError::new(path, err).into()),
            ErrorPolicy::Skip if is_not_found(&err) => {
                // Vanished between listing and stat: treat as gone.
                trace!(path = ?path, "entry vanished during traversal");
                Ok(())
            }
            ErrorPolicy::Skip => {
                let cause = format!("{err:#}");
                warn!(path = ?path, error = %cause, "skipping unreadable entry");
                snapshot.skipped.push(path);
                Ok(())
            }
        }
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<io::Error>())
        .any(|io_err| io_err.kind() == io::ErrorKind::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::select::{AnyFile, ExtensionSelector};
    use std::time::Duration;

    fn ts(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn paths(snapshot: &Snapshot) -> Vec<String> {
        snapshot
            .entries
            .iter()
            .map(|(p, _)| p.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn walks_depth_first_in_name_order() {
        let fs = MockFileSystem::new();
        fs.add_file("root/b.go", ts(1));
        fs.add_file("root/a/z.go", ts(1));
        fs.add_file("root/a/y.go", ts(1));
        fs.add_file("root/c.txt", ts(1));

        let sel = ExtensionSelector::new(["go"]);
        let snapshot = Scanner::new(&fs, &sel)
            .scan(&[PathBuf::from("root")])
            .unwrap();

        assert_eq!(paths(&snapshot), vec!["root/a/y.go", "root/a/z.go", "root/b.go"]);
    }

    #[test]
    fn overlapping_roots_visit_each_file_once() {
        let fs = MockFileSystem::new();
        fs.add_file("root/sub/a.go", ts(1));

        let snapshot = Scanner::new(&fs, &AnyFile)
            .scan(&[PathBuf::from("root"), PathBuf::from("root/sub")])
            .unwrap();

        assert_eq!(paths(&snapshot), vec!["root/sub/a.go"]);
    }

    #[test]
    fn file_root_is_a_single_entry() {
        let fs = MockFileSystem::new();
        fs.add_file("root/only.go", ts(3));

        let snapshot = Scanner::new(&fs, &AnyFile)
            .scan(&[PathBuf::from("root/only.go")])
            .unwrap();

        assert_eq!(snapshot.entries, vec![(PathBuf::from("root/only.go"), ts(3))]);
    }

    #[test]
    fn abort_policy_reports_offending_path() {
        let fs = MockFileSystem::new();
        fs.add_file("root/locked/a.go", ts(1));
        fs.fail("root/locked");

        let err = Scanner::new(&fs, &AnyFile)
            .scan(&[PathBuf::from("root")])
            .unwrap_err();

        let traversal = err.as_traversal().expect("traversal error");
        assert_eq!(traversal.path, PathBuf::from("root/locked"));
    }

    #[test]
    fn missing_root_is_an_error() {
        let fs = MockFileSystem::new();
        let err = Scanner::new(&fs, &AnyFile)
            .scan(&[PathBuf::from("nowhere")])
            .unwrap_err();
        assert_eq!(err.as_traversal().unwrap().path, PathBuf::from("nowhere"));
    }

    #[test]
    fn skip_policy_records_skipped_entries() {
        let fs = MockFileSystem::new();
        fs.add_file("root/locked/a.go", ts(1));
        fs.add_file("root/open/b.go", ts(1));
        fs.fail("root/locked");

        let snapshot = Scanner::new(&fs, &AnyFile)
            .with_policy(ErrorPolicy::Skip)
            .scan(&[PathBuf::from("root")])
            .unwrap();

        assert_eq!(paths(&snapshot), vec!["root/open/b.go"]);
        assert_eq!(snapshot.skipped, vec![PathBuf::from("root/locked")]);
        assert!(snapshot.is_shadowed(Path::new("root/locked/a.go")));
        assert!(!snapshot.is_shadowed(Path::new("root/open/b.go")));
    }

    #[test]
    fn cancelled_scan_stops_before_next_root() {
        let fs = MockFileSystem::new();
        fs.add_file("root/a.go", ts(1));
        let token = CancellationToken::new();
        token.cancel();

        let err = Scanner::new(&fs, &AnyFile)
            .with_cancel(&token)
            .scan(&[PathBuf::from("root")])
            .unwrap_err();

        assert!(matches!(err, PollwatchError::Cancelled));
    }

    #[test]
    fn cancel_between_roots_skips_the_rest() {
        let fs = MockFileSystem::new();
        fs.add_file("a/one.go", ts(1));
        fs.add_file("b/two.go", ts(1));
        let token = CancellationToken::new();
        let visited = std::sync::Mutex::new(Vec::<PathBuf>::new());
        let sel = |p: &Path| {
            visited.lock().unwrap().push(p.to_path_buf());
            token.cancel();
            true
        };

        let err = Scanner::new(&fs, &sel)
            .with_cancel(&token)
            .scan(&[PathBuf::from("a"), PathBuf::from("b")])
            .unwrap_err();

        assert!(matches!(err, PollwatchError::Cancelled));
        assert_eq!(*visited.lock().unwrap(), vec![PathBuf::from("a/one.go")]);
    }
}
