// src/fs/mock.rs

use super::{EntryMeta, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(SystemTime),
    Dir(Vec<String>), // List of child names
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    /// Paths whose metadata / listing fail, e.g. to simulate EACCES.
    failing: HashSet<PathBuf>,
}

/// In-memory tree with explicit modification times.
///
/// Clones share the same tree, so a test can keep a handle and mutate the
/// tree while a `PollLoop` owns another clone.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

fn parent_or_dot(path: &Path) -> Option<&Path> {
    path.parent().map(|parent| {
        if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        }
    })
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut state = MockState::default();
        // Ensure root exists
        state
            .entries
            .insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Insert (or overwrite) a file with the given mtime, creating parents.
    pub fn add_file(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        state.entries.insert(path.clone(), MockEntry::File(modified));
        Self::link_into_parent(&mut state.entries, &path);
    }

    /// Create an (empty) directory, creating parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        Self::ensure_dir_entry(&mut state.entries, path.as_ref());
    }

    /// Change the mtime of an existing file. Returns false if there is none.
    pub fn touch(&self, path: impl AsRef<Path>, modified: SystemTime) -> bool {
        let mut state = self.state.lock().unwrap();
        match state.entries.get_mut(path.as_ref()) {
            Some(MockEntry::File(mtime)) => {
                *mtime = modified;
                true
            }
            _ => false,
        }
    }

    /// Remove a file or a whole directory subtree.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut state = self.state.lock().unwrap();
        state
            .entries
            .retain(|p, _| p != path && !p.starts_with(path));

        if let (Some(parent), Some(name)) =
            (parent_or_dot(path), path.file_name().and_then(|n| n.to_str()))
        {
            if let Some(MockEntry::Dir(children)) = state.entries.get_mut(parent) {
                children.retain(|c| c != name);
            }
        }
    }

    /// Make every read of `path` fail until [`MockFileSystem::heal`] is called.
    pub fn fail(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        state.failing.insert(path.as_ref().to_path_buf());
    }

    pub fn heal(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        state.failing.remove(path.as_ref());
    }

    fn link_into_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let Some(parent) = parent_or_dot(path) else {
            return;
        };
        if parent == path {
            return;
        }
        Self::ensure_dir_entry(entries, parent);
        if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if !children.iter().any(|c| c == name) {
                    children.push(name.to_string());
                }
            }
        }
    }

    fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if !entries.contains_key(path) {
            entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
            Self::link_into_parent(entries, path);
        }
    }
}

impl FileSystem for MockFileSystem {
    fn metadata(&self, path: &Path) -> Result<EntryMeta> {
        let state = self.state.lock().unwrap();
        if state.failing.contains(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        match state.entries.get(path) {
            Some(MockEntry::File(modified)) => Ok(EntryMeta {
                is_dir: false,
                modified: *modified,
            }),
            Some(MockEntry::Dir(_)) => Ok(EntryMeta {
                is_dir: true,
                modified: SystemTime::UNIX_EPOCH,
            }),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.state.lock().unwrap();
        if state.failing.contains(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        match state.entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ts(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn nested_files_create_parent_dirs() {
        let fs = MockFileSystem::new();
        fs.add_file("root/a/b.go", ts(1));

        assert!(fs.metadata(Path::new("root")).unwrap().is_dir);
        assert!(fs.metadata(Path::new("root/a")).unwrap().is_dir);
        assert_eq!(
            fs.read_dir(Path::new("root/a")).unwrap(),
            vec![PathBuf::from("root/a/b.go")]
        );
    }

    #[test]
    fn remove_drops_subtree_and_parent_link() {
        let fs = MockFileSystem::new();
        fs.add_file("root/a/b.go", ts(1));
        fs.add_file("root/c.go", ts(1));

        fs.remove("root/a");

        assert!(fs.metadata(Path::new("root/a/b.go")).is_err());
        assert_eq!(
            fs.read_dir(Path::new("root")).unwrap(),
            vec![PathBuf::from("root/c.go")]
        );
    }

    #[test]
    fn failing_paths_error_until_healed() {
        let fs = MockFileSystem::new();
        fs.add_file("root/x.go", ts(1));
        fs.fail("root");
        assert!(fs.read_dir(Path::new("root")).is_err());
        fs.heal("root");
        assert!(fs.read_dir(Path::new("root")).is_ok());
    }

    #[test]
    fn touch_only_applies_to_files() {
        let fs = MockFileSystem::new();
        fs.add_file("root/x.go", ts(1));
        assert!(fs.touch("root/x.go", ts(2)));
        assert!(!fs.touch("root", ts(2)));
        assert_eq!(fs.metadata(Path::new("root/x.go")).unwrap().modified, ts(2));
    }
}
