// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol for daemon communication.
//!
//! Wire format: newline-delimited UTF-8 JSON, one request then one
//! response, then EOF. Requests are `{"action": ..., "params": ...}`
//! with kebab-case actions; responses are `{"ok": ..., "error"?,
//! "data"?}` with snake_case fields throughout.

use serde::{Deserialize, Serialize};

/// Parameters of the `create` action.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreateParams {
    /// Branch to create. Empty means: derive one from the prompt and
    /// de-duplicate against existing workstreams.
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub runtime: String,
    #[serde(default)]
    pub skip_pane: bool,
    #[serde(default)]
    pub copy_untracked: bool,
    #[serde(default)]
    pub untracked_files: Vec<String>,
}

/// Parameters of the `pair` action.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PairParams {
    pub branch: String,
    pub container_id: String,
    pub local_path: String,
    #[serde(default)]
    pub previous_branch: Option<String>,
}

/// Request from a client to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", content = "params", rename_all = "kebab-case")]
pub enum Request {
    /// Liveness probe.
    Ping,

    /// Create a workstream.
    Create(CreateParams),

    /// Destroy the workstream named by its branch.
    Rm {
        name: String,
        #[serde(default)]
        delete_branch: bool,
    },

    /// Freeze a workstream's container.
    Pause { name: String },

    /// Unfreeze a workstream's container.
    Unpause { name: String },

    /// Replace a workstream's container, keeping branch and worktree.
    Rebuild { name: String },

    /// Destroy every workstream currently in state. Best-effort.
    DestroyAll,

    /// Activate pairing.
    Pair(PairParams),

    /// Deactivate pairing.
    Unpair,

    /// Return the current pairing state.
    PairStatus,

    /// List workstreams currently in state.
    Ps,

    /// Acknowledge, then tear the daemon down.
    Shutdown,
}

/// Response from the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            ok: true,
            error: None,
            data: None,
        }
    }

    /// Success carrying an action-specific payload.
    pub fn with_data<T: Serialize>(data: T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self {
                ok: true,
                error: None,
                data: Some(value),
            },
            Err(e) => Self::err(format!("failed to encode response: {}", e)),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(message.into()),
            data: None,
        }
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
