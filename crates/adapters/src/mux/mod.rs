// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal multiplexer adapters

mod tmux;

pub use tmux::TmuxAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeMux, MuxCall};

use async_trait::async_trait;
use thiserror::Error;

/// Pane metadata option carrying the owning workstream's branch name.
pub const OPT_WORKSTREAM: &str = "@workstream";
/// Pane metadata option carrying the container name.
pub const OPT_CONTAINER: &str = "@container";
/// Pane metadata option carrying the rendered border text.
pub const OPT_BORDER_TEXT: &str = "@border_text";
/// Pane metadata option carrying the coarse status shown in the border.
pub const OPT_STATUS: &str = "@status";

/// Errors from multiplexer operations
#[derive(Debug, Error)]
pub enum MuxError {
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("pane not found: {0}")]
    PaneNotFound(String),
    #[error("multiplexer command failed: {0}")]
    CommandFailed(String),
    #[error("multiplexer server not running")]
    ServerNotRunning,
}

/// One pane as observed in the multiplexer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PaneInfo {
    pub id: String,
    pub index: u32,
    pub active: bool,
    pub dead: bool,
    pub width: u32,
    pub height: u32,
    pub current_command: String,
}

/// Adapter over the terminal multiplexer.
///
/// Pane metadata (`@workstream`, `@container`, …) lives in the
/// multiplexer itself and is the source of truth for which pane belongs
/// to which workstream — the multiplexer outlives daemon restarts
/// within one session.
#[async_trait]
pub trait MuxAdapter: Clone + Send + Sync + 'static {
    /// Whether a multiplexer server is reachable at all.
    async fn server_running(&self) -> bool;

    /// Server version string.
    async fn version(&self) -> Result<String, MuxError>;

    /// The configured prefix key (used by the status bar hint).
    async fn prefix(&self) -> Result<String, MuxError>;

    /// Create a detached session, optionally running an initial command
    /// in the first pane.
    async fn new_session(&self, name: &str, initial_command: Option<&str>)
        -> Result<(), MuxError>;

    async fn has_session(&self, name: &str) -> Result<bool, MuxError>;

    async fn list_panes(&self, session: &str) -> Result<Vec<PaneInfo>, MuxError>;

    /// Split the session's current window and run `command` in the new
    /// pane; returns the new pane id.
    async fn split_window(&self, session: &str, command: &str) -> Result<String, MuxError>;

    async fn kill_pane(&self, id: &str) -> Result<(), MuxError>;

    /// Replace the command running in a pane (tmux `respawn-pane -k`).
    async fn respawn_pane(&self, id: &str, command: &str) -> Result<(), MuxError>;

    async fn send_keys(&self, pane_id: &str, keys: &[&str]) -> Result<(), MuxError>;

    async fn set_pane_option(&self, id: &str, key: &str, value: &str) -> Result<(), MuxError>;

    /// Read a pane option; `Ok(None)` when the option is unset.
    async fn get_pane_option(&self, id: &str, key: &str) -> Result<Option<String>, MuxError>;

    async fn select_layout(&self, session: &str, layout: &str) -> Result<(), MuxError>;

    async fn set_session_option(
        &self,
        session: &str,
        key: &str,
        value: &str,
    ) -> Result<(), MuxError>;

    async fn set_hook(&self, session: &str, hook: &str, command: &str) -> Result<(), MuxError>;

    async fn display_popup(&self, session: &str, command: &str) -> Result<(), MuxError>;

    async fn kill_server(&self) -> Result<(), MuxError>;

    /// Capture the tail of a pane's visible output.
    async fn capture_pane(&self, id: &str, lines: u32) -> Result<String, MuxError>;

    /// The argv a controller execs to attach the user to `session`.
    fn attach_command(&self, session: &str) -> Vec<String>;
}
