// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ccells merge`: push a workstream's branch and open or merge its PR.

use super::config_here;
use crate::exit::ExitError;
use ccells_adapters::{ForgeAdapter, GhForgeAdapter, GitAdapter, GitCliAdapter};

pub async fn merge(name: &str, do_merge: bool) -> Result<(), ExitError> {
    let config = config_here()?;
    let git = GitCliAdapter::new();
    let forge = GhForgeAdapter::new();

    git.push(&config.repo_root, name)
        .await
        .map_err(|e| ExitError::Operation(e.to_string()))?;

    let number = match forge
        .pr_exists(&config.repo_root, name)
        .await
        .map_err(|e| ExitError::Operation(e.to_string()))?
    {
        Some(number) => {
            println!("PR #{} already open for {}", number, name);
            number
        }
        None => {
            let body = git
                .branch_info(&config.repo_root, name)
                .await
                .unwrap_or_default();
            let (number, url) = forge
                .create_pr(&config.repo_root, name, name, &body)
                .await
                .map_err(|e| ExitError::Operation(e.to_string()))?;
            println!("opened {}", url);
            number
        }
    };

    if do_merge {
        forge
            .merge_pr(&config.repo_root, number)
            .await
            .map_err(|e| ExitError::Operation(e.to_string()))?;
        println!("merged PR #{}", number);
    }

    Ok(())
}
