// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The workstream record: one branch + worktree + container + pane,
//! treated atomically.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lifecycle status of a workstream.
///
/// Transitions are orchestrator-controlled, except that the
/// reconciliation policy may move `Running` → `Exited` when it
/// observes the container stopped without an explicit destroy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkstreamStatus {
    Creating,
    Running,
    Paused,
    Exited,
    Destroying,
    Failed,
}

impl WorkstreamStatus {
    /// Active statuses hold the per-branch uniqueness slot: at most one
    /// workstream per branch may be creating, running, or paused.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Creating | Self::Running | Self::Paused)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Exited | Self::Failed)
    }
}

impl std::fmt::Display for WorkstreamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Creating => "creating",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Exited => "exited",
            Self::Destroying => "destroying",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// One workstream record as persisted in the state snapshot.
///
/// `pane_id` is runtime-only: panes belong to the multiplexer, which
/// outlives daemon restarts within a session, so the pane↔workstream
/// mapping is recovered from pane metadata rather than persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workstream {
    pub id: String,
    pub branch_name: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub runtime: String,
    #[serde(default)]
    pub worktree_path: PathBuf,
    #[serde(default)]
    pub container_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<u64>,
    #[serde(default)]
    pub pr_url: String,
    #[serde(default)]
    pub agent_session_id: String,
    pub status: WorkstreamStatus,
    #[serde(skip)]
    pub pane_id: Option<String>,
}

impl Workstream {
    /// Fresh record in `Creating` status, before any resources exist.
    pub fn reserve(
        id: impl Into<String>,
        branch: impl Into<String>,
        prompt: impl Into<String>,
        runtime: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            branch_name: branch.into(),
            prompt: prompt.into(),
            title: String::new(),
            runtime: runtime.into(),
            worktree_path: PathBuf::new(),
            container_id: String::new(),
            pr_number: None,
            pr_url: String::new(),
            agent_session_id: String::new(),
            status: WorkstreamStatus::Creating,
            pane_id: None,
        }
    }

    /// A running or paused workstream must have both its container and
    /// worktree recorded; callers use this before trusting the record.
    pub fn has_resources(&self) -> bool {
        !self.container_id.is_empty() && !self.worktree_path.as_os_str().is_empty()
    }
}

#[cfg(test)]
#[path = "workstream_tests.rs"]
mod tests;
