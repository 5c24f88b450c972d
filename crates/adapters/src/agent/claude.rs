// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Claude Code agent CLI adapter

use super::{parse_result_envelope, AgentCliAdapter, AgentCliError, OutputFormat, QueryOptions};
use crate::subprocess::{run_with_timeout, stderr_snippet};
use async_trait::async_trait;
use tokio::process::Command;

/// Agent CLI adapter invoking the `claude` binary.
#[derive(Clone)]
pub struct ClaudeCliAdapter {
    binary: String,
}

impl Default for ClaudeCliAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaudeCliAdapter {
    pub fn new() -> Self {
        Self {
            binary: "claude".to_string(),
        }
    }

    /// Use a different binary name (alternative runtimes, test shims).
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl AgentCliAdapter for ClaudeCliAdapter {
    async fn query(&self, prompt: &str, opts: &QueryOptions) -> Result<String, AgentCliError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-p").arg(prompt);

        // Keep the call pure: no tools, no slash commands, no plugins,
        // no telemetry, no session left behind.
        cmd.args([
            "--disallowed-tools",
            "*",
            "--no-session",
            "--setting-sources",
            "none",
        ]);
        cmd.env("DISABLE_TELEMETRY", "1");

        if let Some(ref model) = opts.model {
            cmd.args(["--model", model]);
        }
        if opts.output_format == OutputFormat::Json {
            cmd.args(["--output-format", "json"]);
        }

        let output = run_with_timeout(cmd, opts.timeout, "agent query")
            .await
            .map_err(|msg| {
                if msg.contains("timed out") {
                    AgentCliError::Timeout(opts.timeout.as_secs())
                } else {
                    AgentCliError::BinaryNotFound(msg)
                }
            })?;

        if !output.status.success() {
            return Err(AgentCliError::QueryFailed(stderr_snippet(&output.stderr)));
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        match opts.output_format {
            OutputFormat::Text => Ok(raw.trim().to_string()),
            OutputFormat::Json => parse_result_envelope(&raw),
        }
    }
}
