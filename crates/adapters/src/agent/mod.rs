// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent CLI adapters.
//!
//! The agent CLI is called in exactly one way: a stateless one-shot
//! query used to summarize a prompt into a short title. All flags that
//! would make the call impure (tool use, slash commands, plugins,
//! telemetry, session persistence) are disabled.

mod claude;

pub use claude::ClaudeCliAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeAgentCli;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from agent CLI queries
#[derive(Debug, Error)]
pub enum AgentCliError {
    #[error("agent binary not found: {0}")]
    BinaryNotFound(String),
    #[error("agent query failed: {0}")]
    QueryFailed(String),
    #[error("agent query timed out after {0}s")]
    Timeout(u64),
    #[error("agent returned malformed output: {0}")]
    MalformedOutput(String),
}

/// Output format requested from the agent CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Options for a one-shot agent query.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub timeout: Duration,
    pub model: Option<String>,
    pub output_format: OutputFormat,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            timeout: crate::subprocess::AGENT_QUERY_TIMEOUT,
            model: None,
            output_format: OutputFormat::Text,
        }
    }
}

/// Adapter for one-shot agent CLI queries.
#[async_trait]
pub trait AgentCliAdapter: Clone + Send + Sync + 'static {
    /// Run one stateless query and return the agent's text answer.
    async fn query(&self, prompt: &str, opts: &QueryOptions) -> Result<String, AgentCliError>;
}

/// Parse the agent's `--output-format json` envelope:
/// `{"type":"result","result":"...","is_error":false}`.
pub(crate) fn parse_result_envelope(raw: &str) -> Result<String, AgentCliError> {
    let value: serde_json::Value = serde_json::from_str(raw.trim())
        .map_err(|e| AgentCliError::MalformedOutput(e.to_string()))?;
    if value.get("type").and_then(|t| t.as_str()) != Some("result") {
        return Err(AgentCliError::MalformedOutput(
            "missing result envelope".to_string(),
        ));
    }
    let result = value
        .get("result")
        .and_then(|r| r.as_str())
        .ok_or_else(|| AgentCliError::MalformedOutput("missing result field".to_string()))?;
    if value.get("is_error").and_then(|e| e.as_bool()) == Some(true) {
        return Err(AgentCliError::QueryFailed(result.to_string()));
    }
    Ok(result.to_string())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
