// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::reconciler::{reconcile, ObservedPane};
use ccells_adapters::mux::{OPT_CONTAINER, OPT_WORKSTREAM};
use ccells_adapters::ContainerEngine;
use ccells_core::naming::LABEL_REPOSITORY_ID;
use ccells_core::ErrorKind;

#[tokio::test]
async fn destroy_removes_pane_container_worktree_and_entry() {
    let bed = TestBed::new().await;
    bed.orch.create(bed.create_opts("feat")).await.unwrap();

    bed.orch
        .destroy("feat", DestroyOptions::default())
        .await
        .unwrap();

    assert!(bed.mux.list_panes(SESSION).await.unwrap().is_empty());
    assert!(bed.engine.container_names().is_empty());
    assert!(bed.git.worktree_paths().is_empty());
    assert!(bed.store.load().unwrap().is_empty());
    // The branch itself survives unless delete_branch was asked for.
    assert!(bed.git.has_branch("feat"));
}

#[tokio::test]
async fn destroy_then_reconcile_references_nothing() {
    let bed = TestBed::new().await;
    bed.orch.create(bed.create_opts("feat")).await.unwrap();
    bed.orch
        .destroy("feat", DestroyOptions::default())
        .await
        .unwrap();

    // Re-observe the world the way the policy does.
    let mut observed = Vec::new();
    for pane in bed.mux.list_panes(SESSION).await.unwrap() {
        let options = bed.mux.pane_options(&pane.id);
        observed.push(ObservedPane {
            pane,
            workstream: options.get(OPT_WORKSTREAM).cloned(),
            container: options.get(OPT_CONTAINER).cloned(),
        });
    }
    let containers = bed
        .engine
        .list_by_label(LABEL_REPOSITORY_ID, "deadbeef0123")
        .await
        .unwrap();

    let result = reconcile(&observed, &containers);
    assert!(result.healthy.is_empty());
    assert!(result.orphan_panes.is_empty());
    assert!(result.orphan_containers.is_empty());
}

#[tokio::test]
async fn keep_worktree_and_delete_branch_options() {
    let bed = TestBed::new().await;
    bed.orch.create(bed.create_opts("feat")).await.unwrap();

    bed.orch
        .destroy(
            "feat",
            DestroyOptions {
                keep_worktree: true,
                delete_branch: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(bed.git.worktree_paths().len(), 1);
    assert!(!bed.git.has_branch("feat"));
}

#[tokio::test]
async fn destroy_continues_past_failures_and_aggregates() {
    let bed = TestBed::new().await;
    bed.orch.create(bed.create_opts("feat")).await.unwrap();

    bed.engine.fail_on("stop");
    bed.git.fail_on("remove_worktree");

    let err = bed
        .orch
        .destroy("feat", DestroyOptions::default())
        .await
        .unwrap_err();

    // Both failures are reported together.
    assert!(err.to_string().contains("stop container"));
    assert!(err.to_string().contains("remove worktree"));

    // The container was still force-removed and the entry is gone.
    assert!(bed.engine.container_names().is_empty());
    assert!(bed.store.load().unwrap().is_empty());
}

#[tokio::test]
async fn destroy_unknown_name_is_a_precondition_error() {
    let bed = TestBed::new().await;
    let err = bed
        .orch
        .destroy("ghost", DestroyOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Precondition);
}

#[tokio::test]
async fn destroy_all_sweeps_every_entry() {
    let bed = TestBed::new().await;
    bed.orch.create(bed.create_opts("one")).await.unwrap();
    bed.orch.create(bed.create_opts("two")).await.unwrap();

    let (ok, errors) = bed.orch.destroy_all(DestroyOptions::default()).await;
    assert_eq!(ok, 2);
    assert!(errors.is_empty());
    assert!(bed.store.load().unwrap().is_empty());
    assert!(bed.engine.container_names().is_empty());
}
