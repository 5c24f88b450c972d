// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git CLI adapter

use super::{GitAdapter, GitError};
use crate::subprocess::{run_with_timeout, stderr_snippet, GIT_TIMEOUT, GIT_WORKTREE_TIMEOUT};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

/// Git binary adapter
#[derive(Clone, Default)]
pub struct GitCliAdapter;

impl GitCliAdapter {
    pub fn new() -> Self {
        Self
    }

    async fn run(
        &self,
        repo: &Path,
        args: &[&str],
        timeout: Duration,
        description: &str,
    ) -> Result<std::process::Output, GitError> {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(repo).args(args);
        // Clear GIT_DIR/GIT_WORK_TREE so calls work when the daemon
        // itself was started from inside a worktree.
        cmd.env_remove("GIT_DIR").env_remove("GIT_WORK_TREE");
        run_with_timeout(cmd, timeout, description)
            .await
            .map_err(GitError::CommandFailed)
    }

    async fn run_ok(&self, repo: &Path, args: &[&str], description: &str) -> Result<(), GitError> {
        let output = self.run(repo, args, GIT_TIMEOUT, description).await?;
        if !output.status.success() {
            return Err(GitError::CommandFailed(format!(
                "{}: {}",
                description,
                stderr_snippet(&output.stderr)
            )));
        }
        Ok(())
    }

    async fn stdout(
        &self,
        repo: &Path,
        args: &[&str],
        description: &str,
    ) -> Result<String, GitError> {
        let output = self.run(repo, args, GIT_TIMEOUT, description).await?;
        if !output.status.success() {
            let stderr = stderr_snippet(&output.stderr);
            if stderr.contains("not a git repository") {
                return Err(GitError::NotARepository(repo.display().to_string()));
            }
            return Err(GitError::CommandFailed(format!(
                "{}: {}",
                description, stderr
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn branch_exists(&self, repo: &Path, branch: &str) -> bool {
        let refname = format!("refs/heads/{}", branch);
        self.run(
            repo,
            &["show-ref", "--verify", "--quiet", &refname],
            GIT_TIMEOUT,
            "git show-ref",
        )
        .await
        .map(|o| o.status.success())
        .unwrap_or(false)
    }
}

#[async_trait]
impl GitAdapter for GitCliAdapter {
    async fn current_branch(&self, repo: &Path) -> Result<String, GitError> {
        self.stdout(repo, &["branch", "--show-current"], "git branch --show-current")
            .await
    }

    async fn base_branch(&self, repo: &Path) -> Result<String, GitError> {
        for candidate in ["main", "master"] {
            if self.branch_exists(repo, candidate).await {
                return Ok(candidate.to_string());
            }
        }
        self.current_branch(repo).await
    }

    async fn branch_info(&self, repo: &Path, branch: &str) -> Result<String, GitError> {
        if !self.branch_exists(repo, branch).await {
            return Err(GitError::BranchNotFound(branch.to_string()));
        }
        let base = self.base_branch(repo).await?;
        let log = self
            .stdout(
                repo,
                &["log", "--oneline", "-10", branch, "--"],
                "git log",
            )
            .await?;
        let range = format!("{}...{}", base, branch);
        let diffstat = self
            .stdout(repo, &["diff", "--stat", &range], "git diff --stat")
            .await
            .unwrap_or_default();
        if diffstat.is_empty() {
            Ok(log)
        } else {
            Ok(format!("{}\n\n{}", log, diffstat))
        }
    }

    async fn untracked_files(&self, repo: &Path) -> Result<Vec<PathBuf>, GitError> {
        let out = self
            .stdout(
                repo,
                &["ls-files", "--others", "--exclude-standard"],
                "git ls-files",
            )
            .await?;
        Ok(out.lines().map(PathBuf::from).collect())
    }

    async fn add_worktree(
        &self,
        repo: &Path,
        path: &Path,
        branch: &str,
        base: &str,
    ) -> Result<(), GitError> {
        let path_str = path.display().to_string();
        let output = self
            .run(
                repo,
                &["worktree", "add", "-b", branch, &path_str, base],
                GIT_WORKTREE_TIMEOUT,
                "git worktree add",
            )
            .await?;
        if !output.status.success() {
            return Err(GitError::CommandFailed(format!(
                "git worktree add: {}",
                stderr_snippet(&output.stderr)
            )));
        }
        Ok(())
    }

    async fn remove_worktree(&self, repo: &Path, path: &Path) -> Result<(), GitError> {
        let path_str = path.display().to_string();
        let output = self
            .run(
                repo,
                &["worktree", "remove", "--force", &path_str],
                GIT_WORKTREE_TIMEOUT,
                "git worktree remove",
            )
            .await?;
        if !output.status.success() {
            // The worktree directory may already be gone; prune the
            // registration so the branch can be reused.
            let _ = self
                .run(repo, &["worktree", "prune"], GIT_TIMEOUT, "git worktree prune")
                .await;
            let stderr = stderr_snippet(&output.stderr);
            if !stderr.contains("is not a working tree") {
                return Err(GitError::CommandFailed(format!(
                    "git worktree remove: {}",
                    stderr
                )));
            }
        }
        Ok(())
    }

    async fn delete_branch(&self, repo: &Path, name: &str) -> Result<(), GitError> {
        self.run_ok(repo, &["branch", "-D", name], "git branch -D")
            .await
    }

    async fn push(&self, repo: &Path, branch: &str) -> Result<(), GitError> {
        let output = self
            .run(
                repo,
                &["push", "-u", "origin", branch],
                GIT_WORKTREE_TIMEOUT,
                "git push",
            )
            .await?;
        if !output.status.success() {
            return Err(GitError::CommandFailed(format!(
                "git push: {}",
                stderr_snippet(&output.stderr)
            )));
        }
        Ok(())
    }

    async fn fetch_and_rebase(&self, repo: &Path) -> Result<(), GitError> {
        let output = self
            .run(repo, &["fetch"], GIT_WORKTREE_TIMEOUT, "git fetch")
            .await?;
        if !output.status.success() {
            return Err(GitError::CommandFailed(format!(
                "git fetch: {}",
                stderr_snippet(&output.stderr)
            )));
        }
        self.run_ok(repo, &["rebase"], "git rebase").await
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
