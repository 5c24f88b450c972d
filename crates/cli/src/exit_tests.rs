// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    usage        = { ExitError::Usage("x".into()), 1 },
    prerequisite = { ExitError::Prerequisite("x".into()), 2 },
    unreachable  = { ExitError::Unreachable("x".into()), 3 },
    operation    = { ExitError::Operation("x".into()), 4 },
)]
fn exit_codes(err: ExitError, expected: i32) {
    assert_eq!(err.code(), expected);
}

#[test]
fn unreachable_daemon_suggests_up() {
    let err: ExitError = ClientError::DaemonNotRunning.into();
    assert_eq!(err.code(), 3);
    assert!(err.to_string().contains("ccells up"));
}

#[test]
fn rejected_operations_keep_their_message() {
    let err: ExitError = ClientError::Rejected("branch name cannot start with '-'".into()).into();
    assert_eq!(err.code(), 4);
    assert_eq!(err.to_string(), "branch name cannot start with '-'");
}
