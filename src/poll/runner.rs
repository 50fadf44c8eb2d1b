// src/poll/runner.rs

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task::block_in_place;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::errors::{PollwatchError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::index::{Change, FileIndex, Scanner};
use crate::types::ChangeKind;

use super::{ChangeSink, WatchConfig};

/// Periodic rescan driver.
///
/// Everything runs on the task that awaits [`PollLoop::start`]: traversal,
/// diffing and sink calls are sequential, and the only suspension point is
/// the sleep between cycles. A slow sink therefore stretches the effective
/// poll period.
///
/// Traversal is blocking I/O. On a multi-thread runtime each scan runs under
/// [`block_in_place`] so other tasks move to another worker; on a
/// current-thread runtime the scan blocks that thread for its duration.
pub struct PollLoop<S: ChangeSink> {
    config: WatchConfig,
    fs: Arc<dyn FileSystem>,
    index: FileIndex,
    sink: S,
    cancel: CancellationToken,
}

impl<S: ChangeSink> fmt::Debug for PollLoop<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollLoop")
            .field("config", &self.config)
            .field("tracked", &self.index.len())
            .finish_non_exhaustive()
    }
}

impl<S: ChangeSink> PollLoop<S> {
    /// Watch the real filesystem.
    pub fn new(config: WatchConfig, sink: S) -> Self {
        Self::with_fs(config, Arc::new(RealFileSystem), sink)
    }

    pub fn with_fs(config: WatchConfig, fs: Arc<dyn FileSystem>, sink: S) -> Self {
        Self {
            config,
            fs,
            index: FileIndex::new(),
            sink,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned token (e.g. shared with a Ctrl-C handler).
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// A handle that stops the loop at its next check.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn index(&self) -> &FileIndex {
        &self.index
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Initial full scan.
    pub fn build_baseline(&mut self) -> Result<()> {
        let scanner = Scanner::new(self.fs.as_ref(), self.config.selector())
            .with_policy(self.config.error_policy())
            .with_cancel(&self.cancel);
        self.index.build(&scanner, self.config.roots())?;
        info!(tracked = self.index.len(), "baseline scan complete");
        Ok(())
    }

    /// One reconciliation cycle: rescan, then notify the sink once per change.
    pub fn run_cycle(&mut self) -> Result<Vec<Change>> {
        let scanner = Scanner::new(self.fs.as_ref(), self.config.selector())
            .with_policy(self.config.error_policy())
            .with_cancel(&self.cancel);
        let changes = self.index.reconcile(&scanner, self.config.roots())?;

        if changes.is_empty() {
            debug!(tracked = self.index.len(), "no changes");
        } else {
            let count = |kind: ChangeKind| changes.iter().filter(|c| c.kind == kind).count();
            info!(
                added = count(ChangeKind::Added),
                modified = count(ChangeKind::Modified),
                deleted = count(ChangeKind::Deleted),
                tracked = self.index.len(),
                "changes detected"
            );
        }

        dispatch(&mut self.sink, &changes);
        Ok(changes)
    }

    /// Build the baseline, then poll forever.
    ///
    /// Returns `Ok(())` only once the cancel token fires. A traversal error
    /// (from the baseline or any later cycle) ends the loop and is returned
    /// as is; there is no retry.
    pub async fn start(mut self) -> Result<()> {
        info!(
            roots = ?self.config.roots(),
            interval = ?self.config.interval(),
            policy = ?self.config.error_policy(),
            "poll loop starting"
        );

        if self.cancel.is_cancelled() {
            info!("cancelled before baseline scan");
            return Ok(());
        }

        match blocking(|| self.build_baseline()) {
            Ok(()) => {}
            Err(PollwatchError::Cancelled) => return Ok(()),
            Err(err) => {
                error!(error = %err, "baseline scan failed");
                return Err(err);
            }
        }

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!("cancellation requested; stopping poll loop");
                    return Ok(());
                }
                _ = sleep(self.config.interval()) => {}
            }

            if self.cancel.is_cancelled() {
                info!("cancellation requested; stopping poll loop");
                return Ok(());
            }

            match blocking(|| self.run_cycle()) {
                Ok(_) => {}
                Err(PollwatchError::Cancelled) => {
                    info!("cancelled during rescan; stopping poll loop");
                    return Ok(());
                }
                Err(err) => {
                    error!(error = %err, "rescan failed; stopping poll loop");
                    return Err(err);
                }
            }
        }
    }
}

fn blocking<R>(f: impl FnOnce() -> R) -> R {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => block_in_place(f),
        _ => f(),
    }
}

/// Deliver changes in order. A panicking sink is logged and skipped so one
/// bad notification cannot take the loop down.
fn dispatch<S: ChangeSink>(sink: &mut S, changes: &[Change]) {
    for change in changes {
        let delivered = panic::catch_unwind(AssertUnwindSafe(|| sink.notify(change)));
        if let Err(payload) = delivered {
            error!(
                path = ?change.path,
                kind = %change.kind,
                panic = %panic_message(payload.as_ref()),
                "change sink panicked; continuing"
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
