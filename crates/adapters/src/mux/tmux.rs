// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tmux multiplexer adapter

use super::{MuxAdapter, MuxError, PaneInfo};
use crate::subprocess::{run_with_timeout, stderr_snippet, MUX_TIMEOUT};
use async_trait::async_trait;
use tokio::process::Command;

/// Format string handed to `tmux list-panes`; fields are `:`-separated
/// in the order parsed by [`parse_pane_line`].
const PANE_FORMAT: &str =
    "#{pane_id}:#{pane_index}:#{pane_active}:#{pane_dead}:#{pane_width}:#{pane_height}:#{pane_current_command}";

/// Tmux-based multiplexer adapter
#[derive(Clone, Default)]
pub struct TmuxAdapter;

impl TmuxAdapter {
    pub fn new() -> Self {
        Self
    }

    async fn run(&self, args: &[&str], description: &str) -> Result<std::process::Output, MuxError> {
        let mut cmd = Command::new("tmux");
        cmd.args(args);
        run_with_timeout(cmd, MUX_TIMEOUT, description)
            .await
            .map_err(MuxError::CommandFailed)
    }

    /// Run a tmux command that must succeed, mapping a non-zero exit to
    /// `CommandFailed` with the stderr snippet.
    async fn run_ok(&self, args: &[&str], description: &str) -> Result<(), MuxError> {
        let output = self.run(args, description).await?;
        if !output.status.success() {
            return Err(MuxError::CommandFailed(format!(
                "{}: {}",
                description,
                stderr_snippet(&output.stderr)
            )));
        }
        Ok(())
    }
}

/// Parse one line of [`PANE_FORMAT`] output.
///
/// The current command is the final field and may itself contain `:`,
/// so the line is split at most six times.
pub(crate) fn parse_pane_line(line: &str) -> Option<PaneInfo> {
    let mut parts = line.splitn(7, ':');
    let id = parts.next()?.to_string();
    let index = parts.next()?.parse().ok()?;
    let active = parts.next()? == "1";
    let dead = parts.next()? == "1";
    let width = parts.next()?.parse().ok()?;
    let height = parts.next()?.parse().ok()?;
    let current_command = parts.next().unwrap_or("").to_string();
    Some(PaneInfo {
        id,
        index,
        active,
        dead,
        width,
        height,
        current_command,
    })
}

#[async_trait]
impl MuxAdapter for TmuxAdapter {
    async fn server_running(&self) -> bool {
        self.run(&["list-sessions"], "tmux list-sessions")
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    async fn version(&self) -> Result<String, MuxError> {
        let output = self.run(&["-V"], "tmux -V").await?;
        if !output.status.success() {
            return Err(MuxError::ServerNotRunning);
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn prefix(&self) -> Result<String, MuxError> {
        let output = self
            .run(
                &["show-options", "-g", "-v", "prefix"],
                "tmux show-options prefix",
            )
            .await?;
        if !output.status.success() {
            return Err(MuxError::CommandFailed(stderr_snippet(&output.stderr)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn new_session(
        &self,
        name: &str,
        initial_command: Option<&str>,
    ) -> Result<(), MuxError> {
        let mut args = vec!["new-session", "-d", "-s", name];
        if let Some(cmd) = initial_command {
            args.push(cmd);
        }
        self.run_ok(&args, "tmux new-session").await
    }

    async fn has_session(&self, name: &str) -> Result<bool, MuxError> {
        let output = self
            .run(&["has-session", "-t", name], "tmux has-session")
            .await?;
        Ok(output.status.success())
    }

    async fn list_panes(&self, session: &str) -> Result<Vec<PaneInfo>, MuxError> {
        let output = self
            .run(
                &["list-panes", "-s", "-t", session, "-F", PANE_FORMAT],
                "tmux list-panes",
            )
            .await?;
        if !output.status.success() {
            return Err(MuxError::SessionNotFound(session.to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(parse_pane_line)
            .collect())
    }

    async fn split_window(&self, session: &str, command: &str) -> Result<String, MuxError> {
        let output = self
            .run(
                &[
                    "split-window",
                    "-t",
                    session,
                    "-P",
                    "-F",
                    "#{pane_id}",
                    command,
                ],
                "tmux split-window",
            )
            .await?;
        if !output.status.success() {
            return Err(MuxError::CommandFailed(format!(
                "split-window: {}",
                stderr_snippet(&output.stderr)
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn kill_pane(&self, id: &str) -> Result<(), MuxError> {
        let output = self.run(&["kill-pane", "-t", id], "tmux kill-pane").await?;
        if !output.status.success() {
            // Pane may already be gone; killing twice is not an error
            // worth surfacing to teardown paths.
            tracing::debug!(pane = id, "kill-pane on missing pane");
        }
        Ok(())
    }

    async fn respawn_pane(&self, id: &str, command: &str) -> Result<(), MuxError> {
        let output = self
            .run(
                &["respawn-pane", "-k", "-t", id, command],
                "tmux respawn-pane",
            )
            .await?;
        if !output.status.success() {
            return Err(MuxError::PaneNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn send_keys(&self, pane_id: &str, keys: &[&str]) -> Result<(), MuxError> {
        let mut args = vec!["send-keys", "-t", pane_id];
        args.extend_from_slice(keys);
        let output = self.run(&args, "tmux send-keys").await?;
        if !output.status.success() {
            return Err(MuxError::PaneNotFound(pane_id.to_string()));
        }
        Ok(())
    }

    async fn set_pane_option(&self, id: &str, key: &str, value: &str) -> Result<(), MuxError> {
        self.run_ok(
            &["set-option", "-p", "-t", id, key, value],
            "tmux set-option -p",
        )
        .await
    }

    async fn get_pane_option(&self, id: &str, key: &str) -> Result<Option<String>, MuxError> {
        let output = self
            .run(
                &["show-options", "-p", "-v", "-t", id, key],
                "tmux show-options -p",
            )
            .await?;
        if !output.status.success() {
            // tmux exits non-zero for unknown user options.
            return Ok(None);
        }
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(if value.is_empty() { None } else { Some(value) })
    }

    async fn select_layout(&self, session: &str, layout: &str) -> Result<(), MuxError> {
        self.run_ok(
            &["select-layout", "-t", session, layout],
            "tmux select-layout",
        )
        .await
    }

    async fn set_session_option(
        &self,
        session: &str,
        key: &str,
        value: &str,
    ) -> Result<(), MuxError> {
        let output = self
            .run(
                &["set-option", "-t", session, key, value],
                "tmux set-option",
            )
            .await?;
        if !output.status.success() {
            // Non-fatal: the session works even if styling fails.
            tracing::warn!(
                session,
                key,
                value,
                stderr = %stderr_snippet(&output.stderr),
                "tmux set-option failed"
            );
        }
        Ok(())
    }

    async fn set_hook(&self, session: &str, hook: &str, command: &str) -> Result<(), MuxError> {
        self.run_ok(&["set-hook", "-t", session, hook, command], "tmux set-hook")
            .await
    }

    async fn display_popup(&self, session: &str, command: &str) -> Result<(), MuxError> {
        self.run_ok(
            &["display-popup", "-t", session, "-E", command],
            "tmux display-popup",
        )
        .await
    }

    async fn kill_server(&self) -> Result<(), MuxError> {
        // A dead server is the goal state; ignore the exit status.
        let _ = self.run(&["kill-server"], "tmux kill-server").await;
        Ok(())
    }

    async fn capture_pane(&self, id: &str, lines: u32) -> Result<String, MuxError> {
        let start = format!("-{}", lines);
        let output = self
            .run(
                &["capture-pane", "-t", id, "-p", "-S", &start],
                "tmux capture-pane",
            )
            .await?;
        if !output.status.success() {
            return Err(MuxError::PaneNotFound(id.to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn attach_command(&self, session: &str) -> Vec<String> {
        vec![
            "tmux".to_string(),
            "attach-session".to_string(),
            "-t".to_string(),
            session.to_string(),
        ]
    }
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
