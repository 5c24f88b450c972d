// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::protocol::{Request, Response};
use crate::protocol_wire::{read_response, write_request, DEFAULT_TIMEOUT};
use ccells_adapters::{FakeEngine, FakeGit, FakeMux, MuxAdapter, NoOpNotifyAdapter};
use tempfile::TempDir;
use tokio::io::BufReader;
use tokio::net::UnixStream;

pub(crate) struct DaemonBed {
    pub handle: DaemonHandle,
    pub config: Config,
    pub mux: FakeMux,
    pub engine: FakeEngine,
    pub git: FakeGit,
    _dirs: (TempDir, TempDir),
}

pub(crate) async fn start_daemon() -> DaemonBed {
    let state = TempDir::new().unwrap();
    let repo = TempDir::new().unwrap();

    let config = Config {
        repo_root: repo.path().to_path_buf(),
        state_dir: state.path().to_path_buf(),
        socket_path: state.path().join("daemon.sock"),
        log_path: state.path().join("daemon.log"),
        worktrees_path: state.path().join("worktrees"),
        session: "ccells-test".to_string(),
        repo_id: "deadbeef0123".to_string(),
        repo_slug: "demo".to_string(),
    };

    let mux = FakeMux::new();
    mux.new_session(&config.session, Some("welcome"))
        .await
        .unwrap();
    let engine = FakeEngine::new();
    let git = FakeGit::new();

    let handle = start(
        config.clone(),
        mux.clone(),
        engine.clone(),
        git.clone(),
        NoOpNotifyAdapter::new(),
        None,
    )
    .await
    .unwrap();

    DaemonBed {
        handle,
        config,
        mux,
        engine,
        git,
        _dirs: (state, repo),
    }
}

pub(crate) async fn roundtrip(socket: &std::path::Path, request: &Request) -> Response {
    let stream = UnixStream::connect(socket).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    write_request(&mut write_half, request, DEFAULT_TIMEOUT)
        .await
        .unwrap();
    let mut reader = BufReader::new(read_half);
    read_response(&mut reader, DEFAULT_TIMEOUT).await.unwrap()
}

#[tokio::test]
async fn startup_binds_socket_and_answers_ping() {
    let bed = start_daemon().await;
    assert!(bed.config.socket_path.exists());

    let resp = roundtrip(&bed.config.socket_path, &Request::Ping).await;
    assert_eq!(resp, Response::ok());

    bed.handle.trigger_shutdown();
    bed.handle.wait().await;
}

#[cfg(unix)]
#[tokio::test]
async fn socket_mode_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;
    let bed = start_daemon().await;
    let mode = std::fs::metadata(&bed.config.socket_path)
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);

    bed.handle.trigger_shutdown();
    bed.handle.wait().await;
}

#[tokio::test]
async fn second_daemon_on_same_state_dir_is_refused() {
    let bed = start_daemon().await;

    let err = start(
        bed.config.clone(),
        bed.mux.clone(),
        bed.engine.clone(),
        bed.git.clone(),
        NoOpNotifyAdapter::new(),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LifecycleError::Lock(_)));

    bed.handle.trigger_shutdown();
    bed.handle.wait().await;
}

#[tokio::test]
async fn shutdown_action_removes_socket_and_stops_daemon() {
    let bed = start_daemon().await;

    let resp = roundtrip(&bed.config.socket_path, &Request::Shutdown).await;
    assert_eq!(resp, Response::ok());

    // Within the grace window the socket file is gone and the daemon
    // task has exited.
    tokio::time::timeout(std::time::Duration::from_secs(5), bed.handle.wait())
        .await
        .unwrap();
    assert!(!bed.config.socket_path.exists());
}

#[tokio::test]
async fn restart_recovers_persisted_state() {
    let bed = start_daemon().await;

    let create = Request::Create(crate::protocol::CreateParams {
        branch: "feat/auth".into(),
        prompt: "Add login".into(),
        runtime: "claude".into(),
        ..Default::default()
    });
    let resp = roundtrip(&bed.config.socket_path, &create).await;
    assert!(resp.ok, "create failed: {:?}", resp.error);

    roundtrip(&bed.config.socket_path, &Request::Shutdown).await;
    bed.handle.wait().await;

    // A second daemon over the same state dir sees the workstream.
    let handle = start(
        bed.config.clone(),
        bed.mux.clone(),
        bed.engine.clone(),
        bed.git.clone(),
        NoOpNotifyAdapter::new(),
        None,
    )
    .await
    .unwrap();

    let resp = roundtrip(&bed.config.socket_path, &Request::Ps).await;
    let data = resp.data.unwrap();
    assert_eq!(data["workstreams"][0]["branch_name"], "feat/auth");

    handle.trigger_shutdown();
    handle.wait().await;
}

#[test]
fn config_for_repo_derives_paths_from_the_repo_id() {
    let repo = TempDir::new().unwrap();
    let config = Config::for_repo(repo.path());

    assert_eq!(config.repo_id.len(), 12);
    assert!(config
        .state_dir
        .to_string_lossy()
        .ends_with(&config.repo_id));
    assert_eq!(config.socket_path, config.state_dir.join("daemon.sock"));
    assert_eq!(config.session, format!("ccells-{}", config.repo_id));
}
