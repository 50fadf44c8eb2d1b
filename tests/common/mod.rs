#![allow(dead_code)]

pub use pollwatch_test_utils::{init_tracing, ts, with_timeout, RecordingSink, TempTree};

use std::time::Duration;

/// Poll `cond` every few milliseconds until it holds or 5 seconds pass.
pub async fn wait_until<F>(mut cond: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cond()
}
