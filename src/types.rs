use std::str::FromStr;
use serde::Deserialize;

/// What to do when a single entry cannot be read during a traversal.
///
/// - `Abort`: fail the whole build / reconcile and leave the index untouched
///   (default).
/// - `Skip`: log the entry, leave it out of the snapshot and keep whatever the
///   index already knew about paths at or below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    Abort,
    Skip,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        ErrorPolicy::Abort
    }
}

impl FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(ErrorPolicy::Abort),
            "skip" => Ok(ErrorPolicy::Skip),
            other => Err(format!(
                "invalid on_error policy: {other} (expected \"abort\" or \"skip\")"
            )),
        }
    }
}

/// Kind of change reported for a path in one reconciliation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
