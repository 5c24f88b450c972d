// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory git and forge fakes for tests.

use super::{ForgeAdapter, GitAdapter, GitError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A recorded git call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    AddWorktree { path: PathBuf, branch: String, base: String },
    RemoveWorktree(PathBuf),
    DeleteBranch(String),
    Push(String),
    FetchAndRebase,
}

#[derive(Default)]
struct FakeGitState {
    branches: HashSet<String>,
    worktrees: HashMap<PathBuf, String>,
    untracked: Vec<PathBuf>,
    calls: Vec<GitCall>,
    fail_ops: HashSet<&'static str>,
    current_branch: String,
    base_branch: String,
    create_worktree_dirs: bool,
}

/// In-memory fake implementing [`GitAdapter`].
#[derive(Clone, Default)]
pub struct FakeGit {
    inner: Arc<Mutex<FakeGitState>>,
}

impl FakeGit {
    pub fn new() -> Self {
        let fake = Self::default();
        {
            let mut st = fake.inner.lock();
            st.current_branch = "main".to_string();
            st.base_branch = "main".to_string();
            st.branches.insert("main".to_string());
        }
        fake
    }

    /// Also create/remove real worktree directories on disk, for tests
    /// asserting on filesystem effects.
    pub fn with_real_dirs(self) -> Self {
        self.inner.lock().create_worktree_dirs = true;
        self
    }

    pub fn fail_on(&self, op: &'static str) {
        self.inner.lock().fail_ops.insert(op);
    }

    pub fn clear_failures(&self) {
        self.inner.lock().fail_ops.clear();
    }

    pub fn set_untracked(&self, files: &[&str]) {
        self.inner.lock().untracked = files.iter().map(PathBuf::from).collect();
    }

    pub fn calls(&self) -> Vec<GitCall> {
        self.inner.lock().calls.clone()
    }

    pub fn has_branch(&self, name: &str) -> bool {
        self.inner.lock().branches.contains(name)
    }

    pub fn worktree_paths(&self) -> Vec<PathBuf> {
        self.inner.lock().worktrees.keys().cloned().collect()
    }

    fn check(&self, op: &'static str) -> Result<(), GitError> {
        if self.inner.lock().fail_ops.contains(op) {
            return Err(GitError::CommandFailed(format!("fake: {} failed", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl GitAdapter for FakeGit {
    async fn current_branch(&self, _repo: &Path) -> Result<String, GitError> {
        Ok(self.inner.lock().current_branch.clone())
    }

    async fn base_branch(&self, _repo: &Path) -> Result<String, GitError> {
        Ok(self.inner.lock().base_branch.clone())
    }

    async fn branch_info(&self, _repo: &Path, branch: &str) -> Result<String, GitError> {
        if !self.inner.lock().branches.contains(branch) {
            return Err(GitError::BranchNotFound(branch.to_string()));
        }
        Ok(format!("abc1234 work on {}\n 1 file changed", branch))
    }

    async fn untracked_files(&self, _repo: &Path) -> Result<Vec<PathBuf>, GitError> {
        Ok(self.inner.lock().untracked.clone())
    }

    async fn add_worktree(
        &self,
        _repo: &Path,
        path: &Path,
        branch: &str,
        base: &str,
    ) -> Result<(), GitError> {
        self.check("add_worktree")?;
        let mut st = self.inner.lock();
        st.calls.push(GitCall::AddWorktree {
            path: path.to_path_buf(),
            branch: branch.to_string(),
            base: base.to_string(),
        });
        if st.branches.contains(branch) {
            return Err(GitError::CommandFailed(format!(
                "branch '{}' already exists",
                branch
            )));
        }
        st.branches.insert(branch.to_string());
        st.worktrees.insert(path.to_path_buf(), branch.to_string());
        if st.create_worktree_dirs {
            std::fs::create_dir_all(path)
                .map_err(|e| GitError::CommandFailed(e.to_string()))?;
        }
        Ok(())
    }

    async fn remove_worktree(&self, _repo: &Path, path: &Path) -> Result<(), GitError> {
        self.check("remove_worktree")?;
        let mut st = self.inner.lock();
        st.calls.push(GitCall::RemoveWorktree(path.to_path_buf()));
        st.worktrees.remove(path);
        if st.create_worktree_dirs && path.exists() {
            std::fs::remove_dir_all(path)
                .map_err(|e| GitError::CommandFailed(e.to_string()))?;
        }
        Ok(())
    }

    async fn delete_branch(&self, _repo: &Path, name: &str) -> Result<(), GitError> {
        self.check("delete_branch")?;
        let mut st = self.inner.lock();
        st.calls.push(GitCall::DeleteBranch(name.to_string()));
        if !st.branches.remove(name) {
            return Err(GitError::BranchNotFound(name.to_string()));
        }
        Ok(())
    }

    async fn push(&self, _repo: &Path, branch: &str) -> Result<(), GitError> {
        self.check("push")?;
        self.inner.lock().calls.push(GitCall::Push(branch.to_string()));
        Ok(())
    }

    async fn fetch_and_rebase(&self, _repo: &Path) -> Result<(), GitError> {
        self.check("fetch_and_rebase")?;
        self.inner.lock().calls.push(GitCall::FetchAndRebase);
        Ok(())
    }
}

#[derive(Default)]
struct FakeForgeState {
    prs: HashMap<String, (u64, String)>,
    merged: Vec<u64>,
    next_number: u64,
}

/// In-memory fake implementing [`ForgeAdapter`].
#[derive(Clone, Default)]
pub struct FakeForge {
    inner: Arc<Mutex<FakeForgeState>>,
}

impl FakeForge {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.inner.lock().next_number = 1;
        fake
    }

    pub fn merged(&self) -> Vec<u64> {
        self.inner.lock().merged.clone()
    }
}

#[async_trait]
impl ForgeAdapter for FakeForge {
    async fn pr_exists(&self, _repo: &Path, branch: &str) -> Result<Option<u64>, GitError> {
        Ok(self.inner.lock().prs.get(branch).map(|(n, _)| *n))
    }

    async fn create_pr(
        &self,
        _repo: &Path,
        branch: &str,
        _title: &str,
        _body: &str,
    ) -> Result<(u64, String), GitError> {
        let mut st = self.inner.lock();
        let number = st.next_number;
        st.next_number += 1;
        let url = format!("https://example.test/pr/{}", number);
        st.prs.insert(branch.to_string(), (number, url.clone()));
        Ok((number, url))
    }

    async fn merge_pr(&self, _repo: &Path, number: u64) -> Result<(), GitError> {
        self.inner.lock().merged.push(number);
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
