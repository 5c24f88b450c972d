// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[tokio::test]
async fn same_branch_serializes() {
    let locks = BranchLocks::new();
    let guard = locks.lock("feat").await;

    assert!(locks.try_lock("feat").is_none());
    drop(guard);
    assert!(locks.try_lock("feat").is_some());
}

#[tokio::test]
async fn different_branches_are_independent() {
    let locks = BranchLocks::new();
    let _a = locks.lock("a").await;
    let _b = locks.lock("b").await;
    assert!(locks.try_lock("c").is_some());
}

#[tokio::test]
async fn waiter_proceeds_after_release() {
    let locks = BranchLocks::new();
    let guard = locks.lock("feat").await;

    let locks2 = locks.clone();
    let waiter = tokio::spawn(async move {
        let _guard = locks2.lock("feat").await;
        true
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    drop(guard);
    assert!(tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .unwrap()
        .unwrap());
}
