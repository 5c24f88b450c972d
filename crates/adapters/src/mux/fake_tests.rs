// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::mux::{MuxAdapter, MuxError, OPT_WORKSTREAM};

#[tokio::test]
async fn session_and_pane_model() {
    let mux = FakeMux::new();
    mux.new_session("s", Some("welcome")).await.unwrap();
    assert!(mux.has_session("s").await.unwrap());

    let panes = mux.list_panes("s").await.unwrap();
    assert_eq!(panes.len(), 1);
    assert_eq!(panes[0].current_command, "welcome");

    let new_pane = mux.split_window("s", "agent").await.unwrap();
    assert_eq!(mux.list_panes("s").await.unwrap().len(), 2);

    mux.kill_pane(&new_pane).await.unwrap();
    assert_eq!(mux.list_panes("s").await.unwrap().len(), 1);
}

#[tokio::test]
async fn pane_options_round_trip() {
    let mux = FakeMux::new();
    mux.new_session("s", None).await.unwrap();
    let pane = mux.list_panes("s").await.unwrap()[0].id.clone();

    mux.set_pane_option(&pane, OPT_WORKSTREAM, "feat-x")
        .await
        .unwrap();
    assert_eq!(
        mux.get_pane_option(&pane, OPT_WORKSTREAM).await.unwrap(),
        Some("feat-x".to_string())
    );
    assert_eq!(mux.get_pane_option(&pane, "@other").await.unwrap(), None);
}

#[tokio::test]
async fn scripted_failures_surface_as_errors() {
    let mux = FakeMux::new();
    mux.new_session("s", None).await.unwrap();
    mux.fail_on("split_window");

    let err = mux.split_window("s", "agent").await.unwrap_err();
    assert!(matches!(err, MuxError::CommandFailed(_)));

    mux.clear_failures();
    assert!(mux.split_window("s", "agent").await.is_ok());
}

#[tokio::test]
async fn seeded_panes_appear_with_metadata() {
    let mux = FakeMux::new();
    let pane = mux.seed_pane("s", &[(OPT_WORKSTREAM, "ghost")]);
    assert_eq!(
        mux.get_pane_option(&pane, OPT_WORKSTREAM).await.unwrap(),
        Some("ghost".to_string())
    );
    assert_eq!(mux.list_panes("s").await.unwrap().len(), 1);
}

#[tokio::test]
async fn records_calls_in_order() {
    let mux = FakeMux::new();
    mux.new_session("s", None).await.unwrap();
    let pane = mux.list_panes("s").await.unwrap()[0].id.clone();
    mux.respawn_pane(&pane, "agent").await.unwrap();

    let calls = mux.calls();
    assert_eq!(calls[0], MuxCall::NewSession("s".to_string()));
    assert!(matches!(calls[1], MuxCall::RespawnPane { .. }));
}
