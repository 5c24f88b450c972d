//! Socket protocol specs: request validation and error surfaces.

use crate::prelude::*;
use serde_json::json;

#[test]
fn invalid_branch_is_rejected_with_the_validator_message() {
    let daemon = DaemonUnderTest::start();

    let resp = daemon.request(json!({
        "action": "create",
        "params": {"branch": "-bad", "prompt": "x", "runtime": "claude"}
    }));

    assert_eq!(resp["ok"], false);
    assert_eq!(resp["error"], "branch name cannot start with '-'");

    // No side effects: state stays empty.
    let state = std::fs::read_to_string(daemon.state_file()).unwrap_or_default();
    if !state.is_empty() {
        let snapshot: serde_json::Value = serde_json::from_str(&state).unwrap();
        assert_eq!(snapshot["workstreams"].as_array().map(Vec::len), Some(0));
    }
}

#[test]
fn forbidden_branch_constructs_are_each_rejected() {
    let daemon = DaemonUnderTest::start();

    let cases = [
        "feat..auth",
        "feat//auth",
        "/feat",
        "feat/",
        "-bad",
        "feat.lock",
        "",
    ];
    for branch in cases {
        let resp = daemon.request(json!({
            "action": "create",
            "params": {"branch": branch, "prompt": "x", "runtime": "claude"}
        }));
        assert_eq!(resp["ok"], false, "branch {:?} should be rejected", branch);
    }

    // Length 201 as well.
    let long = "a".repeat(201);
    let resp = daemon.request(json!({
        "action": "create",
        "params": {"branch": long, "prompt": "x", "runtime": "claude"}
    }));
    assert_eq!(resp["ok"], false);
}

#[test]
fn unknown_actions_get_a_malformed_request_error() {
    let daemon = DaemonUnderTest::start();
    let resp = daemon.request(json!({"action": "frobnicate"}));
    assert_eq!(resp["ok"], false);
    assert!(resp["error"]
        .as_str()
        .unwrap()
        .contains("malformed request"));
}

#[test]
fn unknown_workstream_operations_fail_cleanly() {
    let daemon = DaemonUnderTest::start();

    for action in ["rm", "pause", "unpause"] {
        let resp = daemon.request(json!({
            "action": action,
            "params": {"name": "ghost"}
        }));
        assert_eq!(resp["ok"], false, "action {:?}", action);
        assert!(resp["error"]
            .as_str()
            .unwrap()
            .contains("no workstream named"));
    }
}

#[test]
fn ps_on_a_fresh_daemon_is_empty() {
    let daemon = DaemonUnderTest::start();
    let resp = daemon.request(json!({"action": "ps"}));
    assert_eq!(resp["ok"], true);
    assert_eq!(resp["data"]["workstreams"].as_array().map(Vec::len), Some(0));
}

#[test]
fn destroy_all_on_empty_state_reports_zero() {
    let daemon = DaemonUnderTest::start();
    let resp = daemon.request(json!({"action": "destroy-all"}));
    assert_eq!(resp["ok"], true);
    assert_eq!(resp["data"]["destroyed"], 0);
}
