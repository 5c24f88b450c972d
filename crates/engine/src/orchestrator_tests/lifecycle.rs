// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ccells_adapters::mux::OPT_STATUS;
use ccells_adapters::ContainerEngine;
use ccells_core::{ErrorKind, WorkstreamStatus};

#[tokio::test]
async fn pause_freezes_container_and_state() {
    let bed = TestBed::new().await;
    bed.orch.create(bed.create_opts("feat")).await.unwrap();

    bed.orch.pause("feat").await.unwrap();

    let state = bed.engine.inspect("ccells-demo-feat").await.unwrap();
    assert!(state.paused);
    assert_eq!(
        bed.store.load().unwrap().workstreams[0].status,
        WorkstreamStatus::Paused
    );

    let panes = bed.mux.list_panes(SESSION).await.unwrap();
    assert_eq!(
        bed.mux.pane_options(&panes[0].id).get(OPT_STATUS).map(String::as_str),
        Some("paused")
    );
}

#[tokio::test]
async fn pause_requires_running_status() {
    let bed = TestBed::new().await;
    bed.orch.create(bed.create_opts("feat")).await.unwrap();
    bed.orch.pause("feat").await.unwrap();

    let err = bed.orch.pause("feat").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Precondition);
    assert!(err.to_string().contains("paused"));
}

#[tokio::test]
async fn resume_unpauses_and_restores_status() {
    let bed = TestBed::new().await;
    bed.orch.create(bed.create_opts("feat")).await.unwrap();
    bed.orch.pause("feat").await.unwrap();

    bed.orch.resume("feat").await.unwrap();

    let state = bed.engine.inspect("ccells-demo-feat").await.unwrap();
    assert!(!state.paused);
    assert_eq!(
        bed.store.load().unwrap().workstreams[0].status,
        WorkstreamStatus::Running
    );
}

#[tokio::test]
async fn resume_respawns_recorded_agent_session() {
    let bed = TestBed::new().await;
    bed.orch.create(bed.create_opts("feat")).await.unwrap();

    // A prior agent session was recorded for this workstream.
    {
        let table = bed.orch.table();
        let mut table = table.lock();
        table.get_mut("feat").unwrap().agent_session_id =
            "550e8400-e29b-41d4-a716-446655440000".to_string();
    }
    bed.orch.pause("feat").await.unwrap();
    bed.orch.resume("feat").await.unwrap();

    let panes = bed.mux.list_panes(SESSION).await.unwrap();
    assert!(
        panes[0].current_command.contains("--resume 550e8400"),
        "got: {}",
        panes[0].current_command
    );
}

#[tokio::test]
async fn rebuild_replaces_container_but_keeps_worktree_and_branch() {
    let bed = TestBed::new().await;
    bed.orch.create(bed.create_opts("feat")).await.unwrap();
    let before = bed.store.load().unwrap().workstreams[0].clone();

    let outcome = bed.orch.rebuild("feat").await.unwrap();
    assert_eq!(outcome.container, "ccells-demo-feat");

    let after = bed.store.load().unwrap().workstreams[0].clone();
    assert_eq!(after.branch_name, before.branch_name);
    assert_eq!(after.worktree_path, before.worktree_path);
    assert_eq!(after.status, WorkstreamStatus::Running);

    // Old container replaced by a fresh one under the same name.
    assert!(bed
        .engine
        .inspect("ccells-demo-feat")
        .await
        .unwrap()
        .running);
    assert_eq!(bed.git.worktree_paths().len(), 1);
}
