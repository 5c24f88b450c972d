//! Daemon lifecycle specs: startup, readiness, shutdown cleanliness.

use crate::prelude::*;
use serde_json::json;
use std::time::Duration;

#[test]
fn daemon_answers_ping_after_startup() {
    let daemon = DaemonUnderTest::start();
    let resp = daemon.request(json!({"action": "ping"}));
    assert_eq!(resp, json!({"ok": true}));
}

#[test]
fn client_retry_covers_the_startup_race() {
    // request_on dials with retries; issuing a request immediately
    // after spawn exercises the connect-refused window.
    let daemon = DaemonUnderTest::start();
    for _ in 0..5 {
        let resp = daemon.request(json!({"action": "ping"}));
        assert_eq!(resp["ok"], true);
    }
}

#[test]
fn shutdown_acknowledges_then_removes_socket_and_exits() {
    let mut daemon = DaemonUnderTest::start();

    let resp = daemon.request(json!({"action": "shutdown"}));
    assert_eq!(resp["ok"], true);

    assert!(
        daemon.wait_for_exit(Duration::from_secs(5)),
        "daemon should exit within 5s of shutdown"
    );
    assert!(
        !daemon.socket.exists(),
        "socket file should be removed on shutdown"
    );
}

#[test]
fn second_daemon_for_the_same_repo_is_refused() {
    let daemon = DaemonUnderTest::start();

    let output = std::process::Command::new(ccellsd_binary())
        .arg("--repo")
        .arg(daemon.repo.path())
        .env("CCELLS_STATE_DIR", daemon.state_root.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn state_file_survives_restart() {
    let mut daemon = DaemonUnderTest::start();

    // Seed one workstream without touching tmux or docker: skip_pane
    // keeps the mux out, but docker is still a prerequisite, so drive
    // state through the snapshot instead: create fails early and the
    // state file stays fresh.
    let resp = daemon.request(json!({
        "action": "create",
        "params": {"branch": "-bad", "prompt": "x", "runtime": "claude"}
    }));
    assert_eq!(resp["ok"], false);

    daemon.request(json!({"action": "shutdown"}));
    assert!(daemon.wait_for_exit(Duration::from_secs(5)));

    // Restart over the same state root.
    let child = std::process::Command::new(ccellsd_binary())
        .arg("--repo")
        .arg(daemon.repo.path())
        .env("CCELLS_STATE_DIR", daemon.state_root.path())
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .unwrap();

    let resp = request_on(&daemon.socket, json!({"action": "ping"}));
    assert_eq!(resp["ok"], true);

    let resp = request_on(&daemon.socket, json!({"action": "shutdown"}));
    assert_eq!(resp["ok"], true);

    let mut child = child;
    let start = std::time::Instant::now();
    while start.elapsed() < Duration::from_secs(5) {
        if let Ok(Some(_)) = child.try_wait() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    let _ = child.kill();
    panic!("restarted daemon did not exit");
}
