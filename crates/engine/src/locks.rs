// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-branch serialization locks.
//!
//! Mutating operations on the same branch are totally ordered by an
//! async mutex per branch; operations on different branches proceed in
//! parallel. The reconciliation policy uses `try_lock` so it never
//! waits behind (or races with) an in-flight orchestrator transaction.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;

/// Registry of per-branch async mutexes.
#[derive(Clone, Default)]
pub struct BranchLocks {
    inner: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl BranchLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, branch: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock();
        Arc::clone(
            map.entry(branch.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }

    /// Wait for exclusive access to `branch`.
    pub async fn lock(&self, branch: &str) -> OwnedMutexGuard<()> {
        self.entry(branch).lock_owned().await
    }

    /// Take the lock only if free; `None` means an orchestrator
    /// transaction is in flight and the caller should skip this branch.
    pub fn try_lock(&self, branch: &str) -> Option<OwnedMutexGuard<()>> {
        self.entry(branch).try_lock_owned().ok()
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
