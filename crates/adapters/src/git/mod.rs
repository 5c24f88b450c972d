// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git and forge adapters

mod cli;
mod forge;

pub use cli::GitCliAdapter;
pub use forge::GhForgeAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeForge, FakeGit, GitCall};

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from git operations
#[derive(Debug, Error)]
pub enum GitError {
    #[error("not a git repository: {0}")]
    NotARepository(String),
    #[error("branch not found: {0}")]
    BranchNotFound(String),
    #[error("git command failed: {0}")]
    CommandFailed(String),
}

/// Adapter over the git binary.
///
/// Every operation takes the repository root explicitly; the daemon
/// serves exactly one repository but its own cwd is unrelated to it.
#[async_trait]
pub trait GitAdapter: Clone + Send + Sync + 'static {
    /// Name of the currently checked-out branch.
    async fn current_branch(&self, repo: &Path) -> Result<String, GitError>;

    /// The branch new workstreams fork from (`main`, falling back to
    /// `master`, falling back to the current branch).
    async fn base_branch(&self, repo: &Path) -> Result<String, GitError>;

    /// Human-readable description of a branch: recent commits plus a
    /// diffstat against the base branch.
    async fn branch_info(&self, repo: &Path, branch: &str) -> Result<String, GitError>;

    /// Paths of untracked (and not ignored) files, relative to the
    /// repository root.
    async fn untracked_files(&self, repo: &Path) -> Result<Vec<PathBuf>, GitError>;

    /// Create `branch` off `base` as a linked worktree at `path`.
    async fn add_worktree(
        &self,
        repo: &Path,
        path: &Path,
        branch: &str,
        base: &str,
    ) -> Result<(), GitError>;

    async fn remove_worktree(&self, repo: &Path, path: &Path) -> Result<(), GitError>;

    async fn delete_branch(&self, repo: &Path, name: &str) -> Result<(), GitError>;

    async fn push(&self, repo: &Path, branch: &str) -> Result<(), GitError>;

    /// `git fetch` then rebase the current branch onto its upstream.
    async fn fetch_and_rebase(&self, repo: &Path) -> Result<(), GitError>;
}

/// Adapter over the forge CLI for pull-request operations.
#[async_trait]
pub trait ForgeAdapter: Clone + Send + Sync + 'static {
    /// Returns the PR number if one exists for `branch`.
    async fn pr_exists(&self, repo: &Path, branch: &str) -> Result<Option<u64>, GitError>;

    /// Create a PR for `branch`; returns `(number, url)`.
    async fn create_pr(
        &self,
        repo: &Path,
        branch: &str,
        title: &str,
        body: &str,
    ) -> Result<(u64, String), GitError>;

    async fn merge_pr(&self, repo: &Path, number: u64) -> Result<(), GitError>;
}
