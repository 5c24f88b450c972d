// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn runs_command_and_captures_output() {
    let mut cmd = Command::new("echo");
    cmd.arg("hello");
    let out = run_with_timeout(cmd, Duration::from_secs(5), "echo")
        .await
        .unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "hello");
}

#[tokio::test]
async fn times_out_long_running_command() {
    let mut cmd = Command::new("sleep");
    cmd.arg("5");
    let err = run_with_timeout(cmd, Duration::from_millis(50), "sleep")
        .await
        .unwrap_err();
    assert!(err.contains("timed out"), "got: {err}");
}

#[tokio::test]
async fn missing_binary_reports_failure() {
    let cmd = Command::new("ccells-no-such-binary-xyz");
    let err = run_with_timeout(cmd, Duration::from_secs(1), "nothing")
        .await
        .unwrap_err();
    assert!(err.contains("failed"), "got: {err}");
}

#[yare::parameterized(
    first_line   = { b"boom\nmore\n", "boom" },
    skips_blank  = { b"\n  \nreal error\n", "real error" },
    empty        = { b"", "" },
)]
fn stderr_snippets(stderr: &[u8], expected: &str) {
    assert_eq!(stderr_snippet(stderr), expected);
}

#[test]
fn stderr_snippet_caps_length() {
    let long = vec![b'x'; 400];
    let snip = stderr_snippet(&long);
    assert!(snip.len() < 210);
    assert!(snip.ends_with('…'));
}
