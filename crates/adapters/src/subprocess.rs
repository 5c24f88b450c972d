// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Default timeout for tmux commands.
pub const MUX_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for short docker commands (start, stop, inspect).
pub const ENGINE_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for docker image builds (first create pays for the build).
pub const IMAGE_BUILD_TIMEOUT: Duration = Duration::from_secs(180);

/// Default timeout for git operations; worktree add can touch the
/// object store, so it gets more headroom than porcelain queries.
pub const GIT_TIMEOUT: Duration = Duration::from_secs(5);
pub const GIT_WORKTREE_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for agent title-generation queries.
pub const AGENT_TITLE_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for other agent queries.
pub const AGENT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`, converting
/// timeout expiration into a descriptive error message. The child process
/// is killed automatically if the timeout elapses (via the tokio `Child`
/// drop implementation).
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{} failed: {}", description, io_err)),
        Err(_elapsed) => Err(format!(
            "{} timed out after {}s",
            description,
            timeout.as_secs()
        )),
    }
}

/// Trim a stderr payload down to a single-line snippet for error
/// messages surfaced to the user.
pub fn stderr_snippet(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let line = line.trim();
    match line.char_indices().nth(200) {
        Some((idx, _)) => format!("{}…", &line[..idx]),
        None => line.to_string(),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
