// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment overrides for timings and paths.
//!
//! Production uses the defaults; tests tighten the timers so specs run
//! in milliseconds instead of seconds.

use std::path::PathBuf;
use std::time::Duration;

fn parse_duration_secs(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Root under which per-repository state directories live.
/// Default: `~/.local/state/ccells` (or `$CCELLS_STATE_DIR`).
pub fn state_root() -> PathBuf {
    if let Ok(dir) = std::env::var("CCELLS_STATE_DIR") {
        return PathBuf::from(dir);
    }
    dirs::state_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ccells")
}

/// Reconcile ticker interval (default 30 s, `CCELLS_RECONCILE_MS`).
pub fn reconcile_interval() -> Duration {
    parse_duration_ms("CCELLS_RECONCILE_MS").unwrap_or(Duration::from_secs(30))
}

/// Pairing health ticker interval (default 5 s, `CCELLS_PAIR_HEALTH_MS`).
pub fn pairing_interval() -> Duration {
    parse_duration_ms("CCELLS_PAIR_HEALTH_MS").unwrap_or(Duration::from_secs(5))
}

/// Per-request IPC timeout (default 5 s, `CCELLS_TIMEOUT_IPC_MS`).
pub fn ipc_timeout() -> Duration {
    parse_duration_ms("CCELLS_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(5))
}

/// Request-level cap for `create` (default 3 min, `CCELLS_TIMEOUT_CREATE_SECS`).
pub fn create_timeout() -> Duration {
    parse_duration_secs("CCELLS_TIMEOUT_CREATE_SECS").unwrap_or(Duration::from_secs(180))
}

/// Grace window for in-flight handlers at shutdown (default 5 s).
pub fn shutdown_grace() -> Duration {
    parse_duration_ms("CCELLS_SHUTDOWN_GRACE_MS").unwrap_or(Duration::from_secs(5))
}
