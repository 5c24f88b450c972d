// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pairing commands.

use super::client_here;
use crate::exit::ExitError;
use ccells_daemon::protocol::{PairParams, Request};

pub async fn pair(name: &str) -> Result<(), ExitError> {
    let (config, client) = client_here()?;

    // The daemon resolves nothing here: the client looks the container
    // up so the error surfaces before pairing is touched.
    let data = client
        .send_expecting_data(&Request::Ps, crate::client::timeout_ipc())
        .await?;
    let empty = Vec::new();
    let workstreams = data["workstreams"].as_array().unwrap_or(&empty);
    let container = workstreams
        .iter()
        .find(|ws| ws["branch_name"].as_str() == Some(name))
        .and_then(|ws| ws["container_id"].as_str())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ExitError::Operation(format!("no workstream named '{}'", name)))?;

    let current = GitBranch::current(&config.repo_root);
    let state = client
        .send_expecting_data(
            &Request::Pair(PairParams {
                branch: name.to_string(),
                container_id: container.to_string(),
                local_path: config.repo_root.display().to_string(),
                previous_branch: current,
            }),
            crate::client::timeout_ipc(),
        )
        .await?;

    println!(
        "paired with {} ({})",
        name,
        state["status_text"].as_str().unwrap_or("")
    );
    Ok(())
}

pub async fn unpair() -> Result<(), ExitError> {
    let (_config, client) = client_here()?;
    client.send_simple(&Request::Unpair).await?;
    println!("unpaired");
    Ok(())
}

struct GitBranch;

impl GitBranch {
    fn current(repo: &std::path::Path) -> Option<String> {
        let output = std::process::Command::new("git")
            .arg("-C")
            .arg(repo)
            .args(["branch", "--show-current"])
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE")
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if branch.is_empty() {
            None
        } else {
            Some(branch)
        }
    }
}
