// src/poll/sink.rs

//! Notification targets for detected changes.
//!
//! The loop calls [`ChangeSink::notify`] once per changed path, in the order
//! the index reported them, and waits for it to return before moving on.
//! Sinks that want batching have to buffer on their own side.

use std::path::Path;

use tokio::sync::mpsc;
use tracing::debug;

use crate::index::Change;

/// Receives one call per changed path per cycle.
pub trait ChangeSink: Send {
    fn notify(&mut self, change: &Change);
}

/// Plain callbacks only see the path.
impl<F> ChangeSink for F
where
    F: FnMut(&Path) + Send,
{
    fn notify(&mut self, change: &Change) {
        self(&change.path)
    }
}

/// Forwards changes into an unbounded channel, e.g. for a consumer task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Change>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<Change>) -> Self {
        Self { tx }
    }

    /// Convenience: a sink plus the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Change>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl ChangeSink for ChannelSink {
    fn notify(&mut self, change: &Change) {
        if self.tx.send(change.clone()).is_err() {
            debug!(path = ?change.path, "change receiver dropped; discarding");
        }
    }
}

/// Prints one line per change to stdout (logs go to stderr), e.g.
/// `changed: src/main.go (modified)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn line(change: &Change) -> String {
        format!("changed: {} ({})", change.path.display(), change.kind)
    }
}

impl ChangeSink for ConsoleSink {
    fn notify(&mut self, change: &Change) {
        println!("{}", Self::line(change));
    }
}
