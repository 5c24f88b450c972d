// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workstream commands: create, rm, pause, unpause, rebuild, ps, logs.

use super::{client_here, config_here};
use crate::client::timeout_create;
use crate::exit::ExitError;
use crate::title::derive_title_and_branch;
use ccells_adapters::{ClaudeCliAdapter, GitAdapter, GitCliAdapter, MuxAdapter, TmuxAdapter};
use ccells_config::{resolve_runtime, ConfigFile, GLOBAL_CONFIG_PATH, PROJECT_CONFIG_FILE};
use ccells_daemon::protocol::{CreateParams, Request};

/// Resolve the runtime kind for this invocation.
fn runtime_for(flag: Option<&str>, repo_root: &std::path::Path) -> Result<String, ExitError> {
    let project = ConfigFile::load(&repo_root.join(PROJECT_CONFIG_FILE));
    let global_path = dirs_config().join(GLOBAL_CONFIG_PATH);
    let global = ConfigFile::load(&global_path);
    resolve_runtime(flag, &project, &global)
        .map(|kind| kind.binary().to_string())
        .map_err(|e| ExitError::Usage(e.to_string()))
}

fn dirs_config() -> std::path::PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return std::path::PathBuf::from(xdg);
    }
    std::env::var("HOME")
        .map(|home| std::path::PathBuf::from(home).join(".config"))
        .unwrap_or_else(|_| std::path::PathBuf::from("."))
}

pub async fn create(
    prompt: &str,
    branch: Option<&str>,
    runtime_flag: Option<&str>,
    copy_untracked: bool,
) -> Result<(), ExitError> {
    let (config, client) = client_here()?;
    let runtime = runtime_for(runtime_flag, &config.repo_root)?;

    let (branch, title) = match branch {
        Some(branch) => (branch.to_string(), String::new()),
        None => {
            let derived = derive_title_and_branch(&ClaudeCliAdapter::new(), prompt).await;
            (derived.branch, derived.title)
        }
    };

    let untracked_files = if copy_untracked {
        GitCliAdapter::new()
            .untracked_files(&config.repo_root)
            .await
            .map(|files| {
                files
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    let request = Request::Create(CreateParams {
        branch,
        prompt: prompt.to_string(),
        title,
        runtime,
        skip_pane: false,
        copy_untracked,
        untracked_files,
    });

    let data = client
        .send_expecting_data(&request, timeout_create())
        .await?;
    let container = data["container"].as_str().unwrap_or("?");
    println!("created workstream in {}", container);
    Ok(())
}

pub async fn rm(name: &str, delete_branch: bool) -> Result<(), ExitError> {
    let (_config, client) = client_here()?;
    client
        .send_simple(&Request::Rm {
            name: name.to_string(),
            delete_branch,
        })
        .await?;
    println!("destroyed {}", name);
    Ok(())
}

pub async fn pause(name: &str) -> Result<(), ExitError> {
    let (_config, client) = client_here()?;
    client
        .send_simple(&Request::Pause {
            name: name.to_string(),
        })
        .await?;
    println!("paused {}", name);
    Ok(())
}

pub async fn unpause(name: &str) -> Result<(), ExitError> {
    let (_config, client) = client_here()?;
    client
        .send_simple(&Request::Unpause {
            name: name.to_string(),
        })
        .await?;
    println!("unpaused {}", name);
    Ok(())
}

pub async fn rebuild(name: &str) -> Result<(), ExitError> {
    let (_config, client) = client_here()?;
    let data = client
        .send_expecting_data(
            &Request::Rebuild {
                name: name.to_string(),
            },
            timeout_create(),
        )
        .await?;
    println!(
        "rebuilt {} in {}",
        name,
        data["container"].as_str().unwrap_or("?")
    );
    Ok(())
}

pub async fn ps() -> Result<(), ExitError> {
    let (_config, client) = client_here()?;
    let data = client
        .send_expecting_data(&Request::Ps, crate::client::timeout_ipc())
        .await?;

    let empty = Vec::new();
    let workstreams = data["workstreams"].as_array().unwrap_or(&empty);
    if workstreams.is_empty() {
        println!("no workstreams");
        return Ok(());
    }

    println!("{:<24} {:<10} {:<32} PROMPT", "BRANCH", "STATUS", "CONTAINER");
    for ws in workstreams {
        let prompt = ws["prompt"].as_str().unwrap_or("");
        let prompt_short: String = prompt.chars().take(40).collect();
        println!(
            "{:<24} {:<10} {:<32} {}",
            ws["branch_name"].as_str().unwrap_or("?"),
            ws["status"].as_str().unwrap_or("?"),
            ws["container_id"].as_str().unwrap_or("-"),
            prompt_short,
        );
    }
    Ok(())
}

pub async fn logs(name: &str) -> Result<(), ExitError> {
    let config = config_here()?;
    let mux = TmuxAdapter::new();

    let panes = mux
        .list_panes(&config.session)
        .await
        .map_err(|e| ExitError::Prerequisite(format!("no session: {}", e)))?;

    for pane in panes {
        let claimed = mux
            .get_pane_option(&pane.id, ccells_adapters::mux::OPT_WORKSTREAM)
            .await
            .ok()
            .flatten();
        if claimed.as_deref() == Some(name) {
            let output = mux
                .capture_pane(&pane.id, 200)
                .await
                .map_err(|e| ExitError::Operation(e.to_string()))?;
            print!("{}", output);
            return Ok(());
        }
    }

    Err(ExitError::Operation(format!(
        "no pane found for workstream '{}'",
        name
    )))
}

#[cfg(test)]
#[path = "workstream_tests.rs"]
mod tests;
