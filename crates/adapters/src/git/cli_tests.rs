// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::git::GitAdapter;
use std::process::Command as StdCommand;
use tempfile::TempDir;

fn git_available() -> bool {
    StdCommand::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

macro_rules! skip_if_no_git {
    () => {
        if !git_available() {
            eprintln!("skipping: git not available");
            return;
        }
    };
}

/// Create a git repo with one commit on `main`.
fn init_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let run = |args: &[&str]| {
        let out = StdCommand::new("git")
            .arg("-C")
            .arg(dir.path())
            .args(args)
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE")
            .output()
            .unwrap();
        assert!(
            out.status.success(),
            "git {:?}: {}",
            args,
            String::from_utf8_lossy(&out.stderr)
        );
    };
    run(&["init", "-b", "main"]);
    run(&["config", "user.email", "test@example.com"]);
    run(&["config", "user.name", "Test"]);
    std::fs::write(dir.path().join("README.md"), "hello\n").unwrap();
    run(&["add", "."]);
    run(&["commit", "-m", "initial"]);
    dir
}

#[tokio::test]
async fn reads_current_and_base_branch() {
    skip_if_no_git!();
    let repo = init_repo();
    let git = GitCliAdapter::new();

    assert_eq!(git.current_branch(repo.path()).await.unwrap(), "main");
    assert_eq!(git.base_branch(repo.path()).await.unwrap(), "main");
}

#[tokio::test]
async fn worktree_add_and_remove_round_trip() {
    skip_if_no_git!();
    let repo = init_repo();
    let git = GitCliAdapter::new();
    let wt = repo.path().join("worktrees").join("feat-auth");

    git.add_worktree(repo.path(), &wt, "feat/auth", "main")
        .await
        .unwrap();
    assert!(wt.join("README.md").exists());
    assert!(wt.join(".git").is_file());

    git.remove_worktree(repo.path(), &wt).await.unwrap();
    assert!(!wt.exists());

    git.delete_branch(repo.path(), "feat/auth").await.unwrap();
}

#[tokio::test]
async fn remove_worktree_tolerates_missing_directory() {
    skip_if_no_git!();
    let repo = init_repo();
    let git = GitCliAdapter::new();
    let wt = repo.path().join("worktrees").join("gone");

    git.add_worktree(repo.path(), &wt, "gone", "main")
        .await
        .unwrap();
    std::fs::remove_dir_all(&wt).unwrap();

    // Directory vanished out from under us; removal still unregisters.
    git.remove_worktree(repo.path(), &wt).await.unwrap();
    git.delete_branch(repo.path(), "gone").await.unwrap();
}

#[tokio::test]
async fn lists_untracked_files() {
    skip_if_no_git!();
    let repo = init_repo();
    let git = GitCliAdapter::new();

    std::fs::write(repo.path().join(".env"), "SECRET=1\n").unwrap();
    std::fs::create_dir(repo.path().join("notes")).unwrap();
    std::fs::write(repo.path().join("notes/todo.txt"), "x\n").unwrap();

    let mut untracked = git.untracked_files(repo.path()).await.unwrap();
    untracked.sort();
    assert_eq!(
        untracked,
        vec![PathBuf::from(".env"), PathBuf::from("notes/todo.txt")]
    );
}

#[tokio::test]
async fn branch_info_includes_commits() {
    skip_if_no_git!();
    let repo = init_repo();
    let git = GitCliAdapter::new();

    let info = git.branch_info(repo.path(), "main").await.unwrap();
    assert!(info.contains("initial"), "got: {info}");

    let err = git.branch_info(repo.path(), "nope").await.unwrap_err();
    assert!(matches!(err, GitError::BranchNotFound(_)));
}

#[tokio::test]
async fn non_repo_reports_not_a_repository() {
    skip_if_no_git!();
    let dir = TempDir::new().unwrap();
    let git = GitCliAdapter::new();
    let err = git.current_branch(dir.path()).await.unwrap_err();
    assert!(matches!(err, GitError::NotARepository(_)));
}
