// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::lifecycle::tests::{roundtrip, start_daemon};
use crate::protocol::{CreateParams, PairParams, Request, Response};
use crate::protocol_wire::{read_response, write_request, DEFAULT_TIMEOUT};
use ccells_adapters::MuxAdapter;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

fn create_req(branch: &str) -> Request {
    Request::Create(CreateParams {
        branch: branch.into(),
        prompt: "Add login".into(),
        runtime: "claude".into(),
        ..Default::default()
    })
}

#[tokio::test]
async fn create_then_rm_round_trips_through_state() {
    let bed = start_daemon().await;

    let resp = roundtrip(&bed.config.socket_path, &create_req("feat/auth")).await;
    assert!(resp.ok, "create failed: {:?}", resp.error);
    let data = resp.data.unwrap();
    assert_eq!(data["container"], "ccells-demo-feat-auth");

    // State snapshot holds exactly one running entry.
    let store = ccells_storage::StateStore::new(&bed.config.state_dir);
    let snap = store.load().unwrap();
    assert_eq!(snap.workstreams.len(), 1);
    assert_eq!(snap.workstreams[0].status.to_string(), "running");

    let resp = roundtrip(
        &bed.config.socket_path,
        &Request::Rm {
            name: "feat/auth".into(),
            delete_branch: false,
        },
    )
    .await;
    assert!(resp.ok, "rm failed: {:?}", resp.error);
    assert!(store.load().unwrap().is_empty());

    bed.handle.trigger_shutdown();
    bed.handle.wait().await;
}

#[tokio::test]
async fn invalid_branch_is_rejected_verbatim() {
    let bed = start_daemon().await;

    let resp = roundtrip(&bed.config.socket_path, &create_req("-bad")).await;
    assert!(!resp.ok);
    assert_eq!(
        resp.error.as_deref(),
        Some("branch name cannot start with '-'")
    );

    // No side effects anywhere.
    assert!(bed.engine.calls().is_empty());
    assert!(bed.git.calls().is_empty());

    bed.handle.trigger_shutdown();
    bed.handle.wait().await;
}

#[tokio::test]
async fn concurrent_create_of_same_branch_has_one_winner() {
    let bed = start_daemon().await;
    let socket = bed.config.socket_path.clone();

    let a = {
        let socket = socket.clone();
        tokio::spawn(async move { roundtrip(&socket, &create_req("feat")).await })
    };
    let b = {
        let socket = socket.clone();
        tokio::spawn(async move { roundtrip(&socket, &create_req("feat")).await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let oks = results.iter().filter(|r| r.ok).count();
    assert_eq!(oks, 1, "results: {:?}", results);
    let loser = results.iter().find(|r| !r.ok).unwrap();
    assert!(loser.error.as_deref().unwrap_or("").contains("already exists"));

    let store = ccells_storage::StateStore::new(&bed.config.state_dir);
    assert_eq!(store.load().unwrap().workstreams.len(), 1);

    bed.handle.trigger_shutdown();
    bed.handle.wait().await;
}

#[tokio::test]
async fn empty_branch_is_derived_from_the_prompt() {
    let bed = start_daemon().await;

    let req = Request::Create(CreateParams {
        prompt: "Fix the weird parser bug".into(),
        runtime: "claude".into(),
        skip_pane: true,
        ..Default::default()
    });
    let resp = roundtrip(&bed.config.socket_path, &req).await;
    assert!(resp.ok, "create failed: {:?}", resp.error);

    let store = ccells_storage::StateStore::new(&bed.config.state_dir);
    let snap = store.load().unwrap();
    assert_eq!(snap.workstreams[0].branch_name, "fix-weird-parser-bug");

    bed.handle.trigger_shutdown();
    bed.handle.wait().await;
}

#[tokio::test]
async fn pause_and_unpause_flow() {
    let bed = start_daemon().await;
    roundtrip(&bed.config.socket_path, &create_req("feat")).await;

    let resp = roundtrip(
        &bed.config.socket_path,
        &Request::Pause {
            name: "feat".into(),
        },
    )
    .await;
    assert!(resp.ok);

    let resp = roundtrip(
        &bed.config.socket_path,
        &Request::Unpause {
            name: "feat".into(),
        },
    )
    .await;
    assert!(resp.ok);

    bed.handle.trigger_shutdown();
    bed.handle.wait().await;
}

#[tokio::test]
async fn destroy_all_sweeps_state() {
    let bed = start_daemon().await;
    roundtrip(&bed.config.socket_path, &create_req("one")).await;
    roundtrip(&bed.config.socket_path, &create_req("two")).await;

    let resp = roundtrip(&bed.config.socket_path, &Request::DestroyAll).await;
    assert!(resp.ok, "destroy-all failed: {:?}", resp.error);
    assert_eq!(resp.data.unwrap()["destroyed"], 2);

    let store = ccells_storage::StateStore::new(&bed.config.state_dir);
    assert!(store.load().unwrap().is_empty());

    bed.handle.trigger_shutdown();
    bed.handle.wait().await;
}

#[tokio::test]
async fn unknown_workstream_operations_fail_cleanly() {
    let bed = start_daemon().await;

    for request in [
        Request::Rm {
            name: "ghost".into(),
            delete_branch: false,
        },
        Request::Pause {
            name: "ghost".into(),
        },
        Request::Unpause {
            name: "ghost".into(),
        },
        Request::Rebuild {
            name: "ghost".into(),
        },
    ] {
        let resp = roundtrip(&bed.config.socket_path, &request).await;
        assert!(!resp.ok);
        assert!(resp.error.unwrap().contains("no workstream named"));
    }

    bed.handle.trigger_shutdown();
    bed.handle.wait().await;
}

#[tokio::test]
async fn malformed_request_gets_an_error_response() {
    let bed = start_daemon().await;

    let stream = UnixStream::connect(&bed.config.socket_path).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    write_half.write_all(b"{\"action\":\"nope\"}\n").await.unwrap();

    let mut reader = BufReader::new(read_half);
    let resp = read_response(&mut reader, DEFAULT_TIMEOUT).await.unwrap();
    assert!(!resp.ok);
    assert!(resp.error.unwrap().contains("malformed request"));

    bed.handle.trigger_shutdown();
    bed.handle.wait().await;
}

#[tokio::test]
async fn pairing_actions_without_provider_report_unavailable() {
    let bed = start_daemon().await;

    for request in [
        Request::Pair(PairParams {
            branch: "b".into(),
            container_id: "c".into(),
            local_path: "/tmp".into(),
            previous_branch: None,
        }),
        Request::Unpair,
        Request::PairStatus,
    ] {
        let resp = roundtrip(&bed.config.socket_path, &request).await;
        assert_eq!(resp, Response::err("pairing is not available"));
    }

    bed.handle.trigger_shutdown();
    bed.handle.wait().await;
}

#[tokio::test]
async fn ps_lists_workstreams_in_creation_order() {
    let bed = start_daemon().await;
    roundtrip(&bed.config.socket_path, &create_req("one")).await;
    roundtrip(&bed.config.socket_path, &create_req("two")).await;

    let resp = roundtrip(&bed.config.socket_path, &Request::Ps).await;
    let data = resp.data.unwrap();
    assert_eq!(data["workstreams"][0]["branch_name"], "one");
    assert_eq!(data["workstreams"][1]["branch_name"], "two");

    bed.handle.trigger_shutdown();
    bed.handle.wait().await;
}

#[tokio::test]
async fn rebuild_returns_the_fresh_container() {
    let bed = start_daemon().await;
    roundtrip(&bed.config.socket_path, &create_req("feat")).await;

    let resp = roundtrip(
        &bed.config.socket_path,
        &Request::Rebuild {
            name: "feat".into(),
        },
    )
    .await;
    assert!(resp.ok, "rebuild failed: {:?}", resp.error);
    assert_eq!(resp.data.unwrap()["container"], "ccells-demo-feat");

    bed.handle.trigger_shutdown();
    bed.handle.wait().await;
}

#[tokio::test]
async fn pairing_flow_with_sync_provider() {
    use ccells_engine::SyncPairingProvider;
    use std::sync::Arc;

    // A bed with a pairing provider wired in.
    let state = tempfile::TempDir::new().unwrap();
    let repo = tempfile::TempDir::new().unwrap();
    let local = tempfile::TempDir::new().unwrap();

    let config = crate::lifecycle::Config {
        repo_root: repo.path().to_path_buf(),
        state_dir: state.path().to_path_buf(),
        socket_path: state.path().join("daemon.sock"),
        log_path: state.path().join("daemon.log"),
        worktrees_path: state.path().join("worktrees"),
        session: "ccells-test".to_string(),
        repo_id: "deadbeef0123".to_string(),
        repo_slug: "demo".to_string(),
    };

    let mux = ccells_adapters::FakeMux::new();
    mux.new_session(&config.session, None).await.unwrap();
    let engine = ccells_adapters::FakeEngine::new();
    engine.seed_container("ccells-demo-feat", true, &[]);
    let provider = Arc::new(SyncPairingProvider::new(engine.clone()));

    let handle = crate::lifecycle::start(
        config.clone(),
        mux,
        engine,
        ccells_adapters::FakeGit::new(),
        ccells_adapters::NoOpNotifyAdapter::new(),
        Some(provider),
    )
    .await
    .unwrap();

    let resp = roundtrip(
        &config.socket_path,
        &Request::Pair(PairParams {
            branch: "feat".into(),
            container_id: "ccells-demo-feat".into(),
            local_path: local.path().display().to_string(),
            previous_branch: Some("main".into()),
        }),
    )
    .await;
    assert!(resp.ok, "pair failed: {:?}", resp.error);
    assert_eq!(resp.data.as_ref().unwrap()["active"], true);

    let resp = roundtrip(&config.socket_path, &Request::PairStatus).await;
    assert_eq!(resp.data.as_ref().unwrap()["branch"], "feat");

    let resp = roundtrip(&config.socket_path, &Request::Unpair).await;
    assert!(resp.ok);

    let resp = roundtrip(&config.socket_path, &Request::PairStatus).await;
    assert_eq!(resp.data.as_ref().unwrap()["active"], false);

    handle.trigger_shutdown();
    handle.wait().await;
}
