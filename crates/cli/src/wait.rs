// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Waiting for daemon socket readiness.

use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;

/// Default ceiling for socket readiness.
pub const READY_CEILING: Duration = Duration::from_secs(5);

/// Poll interval while waiting (~20 Hz).
pub const READY_POLL: Duration = Duration::from_millis(50);

/// Poll for the socket file to appear, up to `ceiling`.
///
/// Returns `true` as soon as the file exists, `false` when the ceiling
/// elapses. The caller's dialer separately retries
/// connection-refused, covering the gap between file creation and
/// `listen` completion.
pub async fn wait_for_socket(path: &Path, ceiling: Duration) -> bool {
    let deadline = Instant::now() + ceiling;
    loop {
        if path.exists() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(READY_POLL).await;
    }
}

#[cfg(test)]
#[path = "wait_tests.rs"]
mod tests;
