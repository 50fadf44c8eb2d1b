// src/config/model.rs

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::Result;
use crate::poll::WatchConfig;
use crate::select::PatternSelector;
use crate::types::ErrorPolicy;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [watch]
/// roots = ["src", "cmd"]
/// interval = "2s"
/// extensions = ["go"]
/// exclude = ["**/vendor/**"]
/// on_error = "skip"
/// ```
///
/// Every key is optional; an empty file (or no file at all) watches `.` for
/// `.go` files every two seconds.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// `[watch]` section.
    #[serde(default)]
    pub watch: WatchSection,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Roots to traverse, in order.
    #[serde(default = "default_roots")]
    pub roots: Vec<String>,

    /// Poll interval, e.g. `"500ms"`, `"2s"`, `"1m"`.
    #[serde(default = "default_interval")]
    pub interval: String,

    /// Tracked file extensions (suffix match). Ignored when `include` is set.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Include globs; when non-empty they replace the extension rule.
    #[serde(default)]
    pub include: Vec<String>,

    /// Exclude globs, applied after `include` / `extensions`.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// `"abort"` (default) or `"skip"`.
    #[serde(default)]
    pub on_error: ErrorPolicy,
}

fn default_roots() -> Vec<String> {
    vec![".".to_string()]
}

fn default_interval() -> String {
    "2s".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["go".to_string()]
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            interval: default_interval(),
            extensions: default_extensions(),
            include: Vec::new(),
            exclude: Vec::new(),
            on_error: ErrorPolicy::default(),
        }
    }
}

/// Validated configuration. Build with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    watch: WatchSection,
    interval: Duration,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(watch: WatchSection, interval: Duration) -> Self {
        Self { watch, interval }
    }

    pub fn watch_section(&self) -> &WatchSection {
        &self.watch
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Compile the selector and produce the loop's [`WatchConfig`].
    pub fn to_watch_config(&self) -> Result<WatchConfig> {
        let selector = PatternSelector::new(
            &self.watch.extensions,
            &self.watch.include,
            &self.watch.exclude,
        )?;
        let config = WatchConfig::new(self.watch.roots.iter(), self.interval, Arc::new(selector))?
            .with_error_policy(self.watch.on_error);
        Ok(config)
    }
}
