// src/poll/mod.rs

//! Time-driven rescans.
//!
//! [`PollLoop`] owns a [`FileIndex`](crate::index::FileIndex) exclusively:
//! it builds the baseline once, then sleeps, reconciles and hands every
//! reported path to a [`ChangeSink`], until cancelled or until a traversal
//! fails.

pub mod runner;
pub mod sink;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{PollwatchError, Result};
use crate::select::FileSelector;
use crate::types::ErrorPolicy;

pub use runner::PollLoop;
pub use sink::{ChangeSink, ChannelSink, ConsoleSink};

/// What to watch and how often. Immutable once built.
#[derive(Clone)]
pub struct WatchConfig {
    roots: Vec<PathBuf>,
    interval: Duration,
    selector: Arc<dyn FileSelector>,
    error_policy: ErrorPolicy,
}

impl fmt::Debug for WatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchConfig")
            .field("roots", &self.roots)
            .field("interval", &self.interval)
            .field("error_policy", &self.error_policy)
            .finish_non_exhaustive()
    }
}

impl WatchConfig {
    /// An empty `roots` list is allowed and yields a watcher that never
    /// reports anything. `interval` must be non-zero.
    pub fn new<I, P>(roots: I, interval: Duration, selector: Arc<dyn FileSelector>) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        if interval.is_zero() {
            return Err(PollwatchError::ConfigError(
                "poll interval must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            roots: roots.into_iter().map(Into::into).collect(),
            interval,
            selector,
            error_policy: ErrorPolicy::default(),
        })
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn selector(&self) -> &dyn FileSelector {
        self.selector.as_ref()
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.error_policy
    }
}
