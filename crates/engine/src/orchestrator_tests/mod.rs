// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

mod create;
mod destroy;
mod lifecycle;

use super::*;
use ccells_adapters::{FakeEngine, FakeGit, FakeMux, MuxAdapter};
use ccells_storage::{StateStore, WorkstreamTable};
use parking_lot::Mutex;
use std::sync::Arc;
use tempfile::TempDir;

pub(crate) const SESSION: &str = "ccells-test";

/// Everything an orchestrator test needs, wired against fakes.
pub(crate) struct TestBed {
    pub orch: Orchestrator<FakeMux, FakeEngine, FakeGit>,
    pub mux: FakeMux,
    pub engine: FakeEngine,
    pub git: FakeGit,
    pub store: StateStore,
    pub table: Arc<Mutex<WorkstreamTable>>,
    // Held for their Drop cleanup.
    _state_dir: TempDir,
    pub repo: TempDir,
}

impl TestBed {
    /// Fresh bed with a mux session holding one placeholder pane.
    pub async fn new() -> Self {
        Self::build(FakeGit::new()).await
    }

    /// Bed whose git fake creates real worktree directories on disk.
    pub async fn with_real_worktrees() -> Self {
        Self::build(FakeGit::new().with_real_dirs()).await
    }

    async fn build(git: FakeGit) -> Self {
        let state_dir = TempDir::new().unwrap();
        let repo = TempDir::new().unwrap();
        let mux = FakeMux::new();
        mux.new_session(SESSION, Some("welcome")).await.unwrap();
        let engine = FakeEngine::new();

        let store = StateStore::new(state_dir.path());
        let table = Arc::new(Mutex::new(WorkstreamTable::new()));
        let orch = Orchestrator::new(
            OrchestratorDeps {
                mux: mux.clone(),
                engine: engine.clone(),
                git: git.clone(),
            },
            OrchestratorConfig {
                repo_root: repo.path().to_path_buf(),
                repo_id: "deadbeef0123".to_string(),
                repo_slug: "demo".to_string(),
                session: SESSION.to_string(),
                worktrees_root: repo.path().join("worktrees"),
            },
            store.clone(),
            Arc::clone(&table),
        );

        Self {
            orch,
            mux,
            engine,
            git,
            store,
            table,
            _state_dir: state_dir,
            repo,
        }
    }

    pub fn create_opts(&self, branch: &str) -> CreateOptions {
        CreateOptions {
            branch: branch.to_string(),
            prompt: "Add login".to_string(),
            title: String::new(),
            runtime: "claude".to_string(),
            skip_pane: false,
            copy_untracked: false,
            untracked_files: vec![],
        }
    }
}
