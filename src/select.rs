// src/select.rs

//! Selection predicates deciding which files the index tracks.
//!
//! The index only ever asks one question, "is this (non-directory) path
//! tracked?", through [`FileSelector`]. Closures implement it directly; the
//! config-driven [`PatternSelector`] combines an extension rule or include
//! globs with exclude globs.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Decides whether a file path is tracked.
pub trait FileSelector: Send + Sync {
    fn matches(&self, path: &Path) -> bool;
}

impl<F> FileSelector for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn matches(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Tracks every file.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyFile;

impl FileSelector for AnyFile {
    fn matches(&self, _path: &Path) -> bool {
        true
    }
}

/// Suffix match on one or more extensions, e.g. `go` matches `main.go`.
#[derive(Debug, Clone)]
pub struct ExtensionSelector {
    suffixes: Vec<String>,
}

impl ExtensionSelector {
    /// Extensions may be given with or without the leading dot.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suffixes = extensions
            .into_iter()
            .map(|ext| format!(".{}", ext.as_ref().trim().trim_start_matches('.')))
            .collect();
        Self { suffixes }
    }
}

impl FileSelector for ExtensionSelector {
    fn matches(&self, path: &Path) -> bool {
        let s = path.to_string_lossy();
        self.suffixes.iter().any(|suffix| s.ends_with(suffix.as_str()))
    }
}

/// Config-driven selector.
///
/// - If include globs are given, a path must match one of them.
/// - Else, if extensions are given, a path must end with one of them.
/// - Else, every file matches.
///
/// Exclude globs are applied last in every case. Globs are matched against
/// the path as produced by traversal (root joined with the relative part), so
/// patterns should usually start with `**/`.
#[derive(Clone)]
pub struct PatternSelector {
    extensions: Option<ExtensionSelector>,
    include_set: Option<GlobSet>,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for PatternSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternSelector")
            .field("extensions", &self.extensions)
            .field("has_include", &self.include_set.is_some())
            .field("has_exclude", &self.exclude_set.is_some())
            .finish()
    }
}

impl PatternSelector {
    pub fn new(extensions: &[String], include: &[String], exclude: &[String]) -> Result<Self> {
        let include_set = if include.is_empty() {
            None
        } else {
            Some(build_globset(include).context("building include globset")?)
        };

        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(exclude).context("building exclude globset")?)
        };

        let extensions = if include_set.is_none() && !extensions.is_empty() {
            Some(ExtensionSelector::new(extensions))
        } else {
            None
        };

        Ok(Self {
            extensions,
            include_set,
            exclude_set,
        })
    }
}

impl FileSelector for PatternSelector {
    fn matches(&self, path: &Path) -> bool {
        let selected = match (&self.include_set, &self.extensions) {
            (Some(include), _) => include.is_match(path),
            (None, Some(ext)) => ext.matches(path),
            (None, None) => true,
        };
        if !selected {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(path) {
                return false;
            }
        }
        true
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
