// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ccells_adapters::mux::{OPT_CONTAINER, OPT_WORKSTREAM};
use ccells_adapters::{ContainerEngine, EngineCall};
use ccells_core::{ErrorKind, WorkstreamStatus};

#[tokio::test]
async fn create_provisions_worktree_container_and_pane() {
    let bed = TestBed::new().await;

    let outcome = bed.orch.create(bed.create_opts("feat/auth")).await.unwrap();
    assert_eq!(outcome.branch, "feat/auth");
    assert_eq!(outcome.container, "ccells-demo-feat-auth");

    // Git got a worktree on a fresh branch off main.
    assert!(bed.git.has_branch("feat/auth"));
    assert_eq!(bed.git.worktree_paths().len(), 1);

    // Engine built the image, created and started the container.
    let calls = bed.engine.calls();
    assert!(matches!(calls[0], EngineCall::EnsureImage(_)));
    assert!(calls.contains(&EngineCall::Create("ccells-demo-feat-auth".to_string())));
    assert!(bed
        .engine
        .inspect("ccells-demo-feat-auth")
        .await
        .unwrap()
        .running);

    // The sole placeholder pane was respawned and tagged.
    let panes = bed.mux.list_panes(SESSION).await.unwrap();
    assert_eq!(panes.len(), 1);
    let options = bed.mux.pane_options(&panes[0].id);
    assert_eq!(options.get(OPT_WORKSTREAM).map(String::as_str), Some("feat/auth"));
    assert_eq!(
        options.get(OPT_CONTAINER).map(String::as_str),
        Some("ccells-demo-feat-auth")
    );
    assert!(panes[0].current_command.contains("docker exec"));
    assert!(panes[0].current_command.contains("'Add login'"));

    // State persisted with one running entry.
    let snap = bed.store.load().unwrap();
    assert_eq!(snap.workstreams.len(), 1);
    assert_eq!(snap.workstreams[0].status, WorkstreamStatus::Running);
    assert_eq!(snap.workstreams[0].container_id, "ccells-demo-feat-auth");
}

#[tokio::test]
async fn invalid_branch_is_rejected_without_side_effects() {
    let bed = TestBed::new().await;

    let err = bed.orch.create(bed.create_opts("-bad")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Precondition);
    assert_eq!(err.to_string(), "branch name cannot start with '-'");

    assert!(bed.engine.calls().is_empty());
    assert!(bed.git.calls().is_empty());
    assert!(bed.store.load().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_active_branch_is_a_precondition_error() {
    let bed = TestBed::new().await;
    bed.orch.create(bed.create_opts("feat")).await.unwrap();

    let err = bed.orch.create(bed.create_opts("feat")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Precondition);
    assert!(err.to_string().contains("already exists"));
    assert_eq!(bed.store.load().unwrap().workstreams.len(), 1);
}

#[tokio::test]
async fn engine_prerequisite_failure_blocks_create() {
    let bed = TestBed::new().await;
    bed.engine.set_prerequisites_ok(false);

    let err = bed.orch.create(bed.create_opts("feat")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Precondition);
    assert!(bed.git.calls().is_empty());
}

#[tokio::test]
async fn second_workstream_splits_the_window() {
    let bed = TestBed::new().await;
    bed.orch.create(bed.create_opts("one")).await.unwrap();
    bed.orch.create(bed.create_opts("two")).await.unwrap();

    let panes = bed.mux.list_panes(SESSION).await.unwrap();
    assert_eq!(panes.len(), 2);
}

#[tokio::test]
async fn skip_pane_leaves_the_mux_untouched() {
    let bed = TestBed::new().await;
    let mut opts = bed.create_opts("headless");
    opts.skip_pane = true;
    bed.orch.create(opts).await.unwrap();

    let panes = bed.mux.list_panes(SESSION).await.unwrap();
    assert_eq!(panes.len(), 1);
    assert!(bed.mux.pane_options(&panes[0].id).is_empty());
}

#[tokio::test]
async fn copies_untracked_files_into_the_worktree() {
    let bed = TestBed::with_real_worktrees().await;
    std::fs::write(bed.repo.path().join(".env"), "KEY=1\n").unwrap();

    let mut opts = bed.create_opts("feat");
    opts.copy_untracked = true;
    opts.untracked_files = vec![".env".to_string()];
    bed.orch.create(opts).await.unwrap();

    let copied = bed.repo.path().join("worktrees/feat/.env");
    assert_eq!(std::fs::read_to_string(copied).unwrap(), "KEY=1\n");
}

// --- compensation on failure -----------------------------------------

#[tokio::test]
async fn container_create_failure_unwinds_worktree_and_entry() {
    let bed = TestBed::new().await;
    bed.engine.fail_on("create_container");

    let err = bed.orch.create(bed.create_opts("feat")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Adapter);

    // No worktree, no branch, no container, no state entry.
    assert!(bed.git.worktree_paths().is_empty());
    assert!(!bed.git.has_branch("feat"));
    assert!(bed.engine.container_names().is_empty());
    assert!(bed.store.load().unwrap().is_empty());
}

#[tokio::test]
async fn start_failure_removes_the_created_container() {
    let bed = TestBed::new().await;
    bed.engine.fail_on("start");

    bed.orch.create(bed.create_opts("feat")).await.unwrap_err();

    assert!(bed.engine.container_names().is_empty());
    assert!(bed.git.worktree_paths().is_empty());
    assert!(bed.store.load().unwrap().is_empty());
}

#[tokio::test]
async fn pane_failure_tears_down_container_and_worktree() {
    let bed = TestBed::new().await;
    bed.mux.fail_on("respawn_pane");
    bed.mux.fail_on("split_window");

    bed.orch.create(bed.create_opts("feat")).await.unwrap_err();

    assert!(bed.engine.container_names().is_empty());
    assert!(bed.git.worktree_paths().is_empty());
    assert!(bed.store.load().unwrap().is_empty());
}

#[tokio::test]
async fn metadata_failure_kills_the_fresh_pane() {
    let bed = TestBed::new().await;
    bed.mux.fail_on("set_pane_option");

    bed.orch.create(bed.create_opts("feat")).await.unwrap_err();

    // The placeholder pane was respawned then killed by compensation.
    let panes = bed.mux.list_panes(SESSION).await.unwrap();
    assert!(panes.is_empty());
    assert!(bed.engine.container_names().is_empty());
    assert!(bed.store.load().unwrap().is_empty());
}

#[tokio::test]
async fn failed_compensation_leaves_a_failed_entry() {
    let bed = TestBed::new().await;
    bed.engine.fail_on("start");
    bed.engine.fail_on("remove");

    bed.orch.create(bed.create_opts("feat")).await.unwrap_err();

    // Container removal failed, so the entry stays visible as failed.
    let snap = bed.store.load().unwrap();
    assert_eq!(snap.workstreams.len(), 1);
    assert_eq!(snap.workstreams[0].status, WorkstreamStatus::Failed);
}

// --- concurrency -----------------------------------------------------

#[tokio::test]
async fn concurrent_same_branch_creates_one_winner() {
    let bed = std::sync::Arc::new(TestBed::new().await);

    let a = {
        let bed = std::sync::Arc::clone(&bed);
        tokio::spawn(async move { bed.orch.create(bed.create_opts("feat")).await })
    };
    let b = {
        let bed = std::sync::Arc::clone(&bed);
        tokio::spawn(async move { bed.orch.create(bed.create_opts("feat")).await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let oks = results.iter().filter(|r| r.is_ok()).count();
    let preconditions = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.kind == ErrorKind::Precondition))
        .count();

    assert_eq!(oks, 1);
    assert_eq!(preconditions, 1);
    assert_eq!(bed.store.load().unwrap().workstreams.len(), 1);
}

#[tokio::test]
async fn concurrent_distinct_branches_both_succeed() {
    let bed = std::sync::Arc::new(TestBed::new().await);

    let a = {
        let bed = std::sync::Arc::clone(&bed);
        tokio::spawn(async move { bed.orch.create(bed.create_opts("one")).await })
    };
    let b = {
        let bed = std::sync::Arc::clone(&bed);
        tokio::spawn(async move { bed.orch.create(bed.create_opts("two")).await })
    };

    assert!(a.await.unwrap().is_ok());
    assert!(b.await.unwrap().is_ok());
    assert_eq!(bed.store.load().unwrap().workstreams.len(), 2);
}
