// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-sync pairing provider.
//!
//! Watches the local working copy with a filesystem watcher and copies
//! changed files into the paired container's `/workspace` on each
//! health pass. Conflicts are paths modified on both sides since
//! pairing was enabled, derived from the engine's changed-paths diff.

use super::{PairingProvider, PairingState};
use async_trait::async_trait;
use ccells_adapters::ContainerEngine;
use ccells_core::DomainError;
use chrono::Utc;
use notify::{RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Container directory the worktree is mounted at.
const WORKSPACE_ROOT: &str = "/workspace";

#[derive(Default)]
struct SyncState {
    state: PairingState,
    local_path: Option<PathBuf>,
    /// Repo-relative paths the watcher saw change, pending copy.
    pending: BTreeSet<PathBuf>,
    /// Everything we've pushed since enable, for conflict detection.
    pushed: BTreeSet<PathBuf>,
    watcher: Option<notify::RecommendedWatcher>,
}

/// Pairing provider syncing local edits into the container.
#[derive(Clone)]
pub struct SyncPairingProvider<E> {
    engine: E,
    inner: Arc<Mutex<SyncState>>,
}

impl<E: ContainerEngine> SyncPairingProvider<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            inner: Arc::new(Mutex::new(SyncState::default())),
        }
    }

    /// Queue a changed path directly. The watcher feeds this; tests
    /// call it to avoid real filesystem latency.
    pub fn note_change(&self, rel: impl Into<PathBuf>) {
        let mut st = self.inner.lock();
        if st.state.active {
            st.pending.insert(rel.into());
        }
    }

    fn start_watcher(&self, root: &Path) -> Option<notify::RecommendedWatcher> {
        let inner = Arc::clone(&self.inner);
        let root_owned = root.to_path_buf();
        let mut watcher = match notify::recommended_watcher(
            move |event: Result<notify::Event, notify::Error>| {
                let Ok(event) = event else { return };
                let mut st = inner.lock();
                if !st.state.active {
                    return;
                }
                for path in event.paths {
                    if let Ok(rel) = path.strip_prefix(&root_owned) {
                        if !rel.as_os_str().is_empty() && !rel.starts_with(".git") {
                            st.pending.insert(rel.to_path_buf());
                        }
                    }
                }
            },
        ) {
            Ok(watcher) => watcher,
            Err(e) => {
                tracing::warn!(error = %e, "pairing: filesystem watcher unavailable");
                return None;
            }
        };
        if let Err(e) = watcher.watch(root, RecursiveMode::Recursive) {
            tracing::warn!(error = %e, "pairing: failed to watch local path");
            return None;
        }
        Some(watcher)
    }
}

#[async_trait]
impl<E: ContainerEngine> PairingProvider for SyncPairingProvider<E> {
    fn is_active(&self) -> bool {
        self.inner.lock().state.active
    }

    async fn enable(
        &self,
        branch: &str,
        container_id: &str,
        local_path: &Path,
        previous_branch: Option<String>,
    ) -> Result<PairingState, DomainError> {
        if !local_path.exists() {
            return Err(DomainError::precondition(format!(
                "local path does not exist: {}",
                local_path.display()
            )));
        }
        self.engine
            .inspect(container_id)
            .await
            .map_err(|e| DomainError::precondition(format!("container not available: {}", e)))?;

        let watcher = self.start_watcher(local_path);

        let mut st = self.inner.lock();
        st.state = PairingState {
            active: true,
            branch: Some(branch.to_string()),
            previous_branch,
            container_id: Some(container_id.to_string()),
            sync_healthy: true,
            conflicts: Vec::new(),
            status_text: format!("paired with {} at {}", branch, Utc::now().format("%H:%M:%S")),
        };
        st.local_path = Some(local_path.to_path_buf());
        st.pending.clear();
        st.pushed.clear();
        st.watcher = watcher;
        Ok(st.state.clone())
    }

    async fn disable(&self) -> Result<(), DomainError> {
        let mut st = self.inner.lock();
        st.watcher = None;
        st.pending.clear();
        st.pushed.clear();
        st.local_path = None;
        let previous = st.state.branch.take();
        st.state = PairingState {
            previous_branch: previous,
            ..PairingState::default()
        };
        Ok(())
    }

    async fn check_health(&self) -> Result<PairingState, DomainError> {
        let (container_id, local_path, pending) = {
            let mut st = self.inner.lock();
            if !st.state.active {
                return Ok(st.state.clone());
            }
            let container = st.state.container_id.clone().unwrap_or_default();
            let local = st.local_path.clone().unwrap_or_default();
            let pending: Vec<PathBuf> = st.pending.iter().cloned().collect();
            st.pending.clear();
            (container, local, pending)
        };

        // Push pending local changes into the container.
        let mut push_errors = 0usize;
        for rel in &pending {
            let src = local_path.join(rel);
            if !src.exists() {
                continue; // deleted locally; leave the container copy
            }
            let dest = format!("{}/{}", WORKSPACE_ROOT, rel.display());
            if let Err(e) = self.engine.copy_into(&container_id, &src, &dest).await {
                tracing::warn!(path = %rel.display(), error = %e, "pairing: copy failed");
                push_errors += 1;
            }
        }

        // Conflicts: paths changed inside the container that we also
        // pushed from the local side.
        let container_changed = self
            .engine
            .changed_paths(&container_id)
            .await
            .unwrap_or_default();

        let mut st = self.inner.lock();
        for rel in pending {
            st.pushed.insert(rel);
        }
        let conflicts: Vec<String> = container_changed
            .iter()
            .filter_map(|p| {
                Path::new(p)
                    .strip_prefix(WORKSPACE_ROOT)
                    .ok()
                    .filter(|rel| st.pushed.contains(*rel))
                    .map(|rel| rel.display().to_string())
            })
            .collect();

        st.state.sync_healthy = push_errors == 0;
        st.state.conflicts = conflicts;
        st.state.status_text = format!(
            "synced {} at {}{}",
            st.pushed.len(),
            Utc::now().format("%H:%M:%S"),
            if st.state.conflicts.is_empty() {
                String::new()
            } else {
                format!(", {} conflict(s)", st.state.conflicts.len())
            }
        );
        Ok(st.state.clone())
    }

    fn get_state(&self) -> PairingState {
        self.inner.lock().state.clone()
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
