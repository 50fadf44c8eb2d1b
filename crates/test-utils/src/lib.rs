pub mod tree;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Once};
use std::time::{Duration, SystemTime};

use pollwatch::{Change, ChangeKind, ChangeSink};
use tracing_subscriber::{fmt, EnvFilter};

pub use tree::TempTree;

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// A fixed point in time, `secs` seconds after the epoch.
pub fn ts(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
}

/// Sink that records every change it is handed.
///
/// Clones share the same log, so a test can keep one while the loop owns
/// the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    seen: Arc<Mutex<Vec<Change>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> Vec<Change> {
        self.seen.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.changes().into_iter().map(|c| c.path).collect()
    }

    pub fn count_of(&self, path: &Path, kind: ChangeKind) -> usize {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.path == path && c.kind == kind)
            .count()
    }
}

impl ChangeSink for RecordingSink {
    fn notify(&mut self, change: &Change) {
        self.seen.lock().unwrap().push(change.clone());
    }
}
