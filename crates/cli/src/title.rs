// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt-to-title derivation via the agent CLI.
//!
//! The interactive create flow asks the agent for a 3–5 word title,
//! then feeds that title through the branch-name derivation. On agent
//! failure the raw prompt is used instead; creation never blocks on a
//! broken or missing agent binary.

use ccells_adapters::subprocess::AGENT_TITLE_TIMEOUT;
use ccells_adapters::{AgentCliAdapter, OutputFormat, QueryOptions};
use ccells_core::generate_branch_name;

const TITLE_INSTRUCTION: &str = "Summarize the following coding task as a 3-5 word title. \
     Reply with the title only, no punctuation, no quotes.\n\nTask: ";

/// Derived naming for a new workstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derived {
    pub title: String,
    pub branch: String,
}

/// Ask the agent for a short title and derive the branch from it,
/// falling back to the raw prompt.
pub async fn derive_title_and_branch<A: AgentCliAdapter>(agent: &A, prompt: &str) -> Derived {
    let opts = QueryOptions {
        timeout: AGENT_TITLE_TIMEOUT,
        model: None,
        output_format: OutputFormat::Json,
    };
    let query = format!("{}{}", TITLE_INSTRUCTION, prompt);

    match agent.query(&query, &opts).await {
        Ok(title) if !title.trim().is_empty() => {
            let title = title.trim().to_string();
            let branch = generate_branch_name(&title);
            Derived { title, branch }
        }
        Ok(_) | Err(_) => Derived {
            title: String::new(),
            branch: generate_branch_name(prompt),
        },
    }
}

#[cfg(test)]
#[path = "title_tests.rs"]
mod tests;
