// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forge adapter backed by the `gh` CLI.

use super::{ForgeAdapter, GitError};
use crate::subprocess::{run_with_timeout, stderr_snippet, GIT_WORKTREE_TIMEOUT};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// GitHub CLI forge adapter
#[derive(Clone, Default)]
pub struct GhForgeAdapter;

impl GhForgeAdapter {
    pub fn new() -> Self {
        Self
    }

    async fn run(
        &self,
        repo: &Path,
        args: &[&str],
        description: &str,
    ) -> Result<std::process::Output, GitError> {
        let mut cmd = Command::new("gh");
        cmd.current_dir(repo).args(args);
        run_with_timeout(cmd, GIT_WORKTREE_TIMEOUT, description)
            .await
            .map_err(GitError::CommandFailed)
    }
}

#[async_trait]
impl ForgeAdapter for GhForgeAdapter {
    async fn pr_exists(&self, repo: &Path, branch: &str) -> Result<Option<u64>, GitError> {
        let output = self
            .run(
                repo,
                &[
                    "pr", "list", "--head", branch, "--json", "number", "--jq", ".[0].number",
                ],
                "gh pr list",
            )
            .await?;
        if !output.status.success() {
            return Err(GitError::CommandFailed(format!(
                "gh pr list: {}",
                stderr_snippet(&output.stderr)
            )));
        }
        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(text.parse().ok())
    }

    async fn create_pr(
        &self,
        repo: &Path,
        branch: &str,
        title: &str,
        body: &str,
    ) -> Result<(u64, String), GitError> {
        let output = self
            .run(
                repo,
                &[
                    "pr", "create", "--head", branch, "--title", title, "--body", body,
                ],
                "gh pr create",
            )
            .await?;
        if !output.status.success() {
            return Err(GitError::CommandFailed(format!(
                "gh pr create: {}",
                stderr_snippet(&output.stderr)
            )));
        }
        // gh prints the PR URL on stdout; the number is its last segment.
        let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let number = url
            .rsplit('/')
            .next()
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        Ok((number, url))
    }

    async fn merge_pr(&self, repo: &Path, number: u64) -> Result<(), GitError> {
        let number_str = number.to_string();
        let output = self
            .run(
                repo,
                &["pr", "merge", &number_str, "--squash", "--delete-branch"],
                "gh pr merge",
            )
            .await?;
        if !output.status.success() {
            return Err(GitError::CommandFailed(format!(
                "gh pr merge: {}",
                stderr_snippet(&output.stderr)
            )));
        }
        Ok(())
    }
}
