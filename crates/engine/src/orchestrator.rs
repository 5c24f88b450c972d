// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The workstream orchestrator.
//!
//! Each operation is a sequence of steps across the multiplexer, the
//! container engine, and git. `create` records a compensation for
//! every completed step and unwinds them in reverse on failure, so a
//! failed create leaves no container, no worktree, and no state entry.
//! `destroy` is the deliberate opposite: best-effort, accumulating
//! errors and continuing, because a user removing a workstream never
//! wants a partial remnant to block them.

use crate::image::{image_tag, DOCKERFILE};
use crate::locks::BranchLocks;
use crate::untracked::copy_untracked;
use ccells_adapters::mux::{OPT_BORDER_TEXT, OPT_CONTAINER, OPT_STATUS, OPT_WORKSTREAM};
use ccells_adapters::subprocess::IMAGE_BUILD_TIMEOUT;
use ccells_adapters::{ContainerEngine, ContainerSpec, GitAdapter, MuxAdapter};
use ccells_core::naming::{LABEL_REPOSITORY_ID, LABEL_WORKSTREAM_ID};
use ccells_core::{
    branch, naming, validate_agent_session_id, validate_branch_name, DomainError, IdGen,
    UuidIdGen, Workstream, WorkstreamStatus,
};
use ccells_storage::{StateStore, WorkstreamTable};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Grace period handed to `engine stop` during destroy.
const STOP_GRACE: Duration = Duration::from_secs(5);

/// How long the pane watchdog waits for the agent's bypass-permissions
/// confirmation dialog before giving up.
const BYPASS_PROMPT_WINDOW: Duration = Duration::from_secs(15);
const BYPASS_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Options for `create`.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub branch: String,
    pub prompt: String,
    pub title: String,
    /// Runtime binary launched inside the container (e.g. `claude`).
    pub runtime: String,
    pub skip_pane: bool,
    pub copy_untracked: bool,
    pub untracked_files: Vec<String>,
}

/// Result of a successful `create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    pub branch: String,
    pub container: String,
}

/// Options for `destroy`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DestroyOptions {
    pub keep_worktree: bool,
    pub delete_branch: bool,
}

/// External dependencies of the orchestrator.
#[derive(Clone)]
pub struct OrchestratorDeps<M, E, G> {
    pub mux: M,
    pub engine: E,
    pub git: G,
}

/// Static configuration of the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub repo_root: PathBuf,
    pub repo_id: String,
    pub repo_slug: String,
    /// Multiplexer session panes are created in.
    pub session: String,
    /// Directory worktrees are created under.
    pub worktrees_root: PathBuf,
}

/// The transactional workstream orchestrator.
pub struct Orchestrator<M, E, G> {
    deps: OrchestratorDeps<M, E, G>,
    config: OrchestratorConfig,
    store: StateStore,
    table: Arc<Mutex<WorkstreamTable>>,
    locks: BranchLocks,
}

/// A recorded inverse action, run in reverse order on create failure.
enum Compensation {
    RemoveEntry { branch: String },
    RemoveWorktree { path: PathBuf, branch: String },
    RemoveContainer { id: String },
    StopAndRemoveContainer { id: String },
    KillPane { id: String },
}

impl<M, E, G> Orchestrator<M, E, G>
where
    M: MuxAdapter,
    E: ContainerEngine,
    G: GitAdapter,
{
    pub fn new(
        deps: OrchestratorDeps<M, E, G>,
        config: OrchestratorConfig,
        store: StateStore,
        table: Arc<Mutex<WorkstreamTable>>,
    ) -> Self {
        Self {
            deps,
            config,
            store,
            table,
            locks: BranchLocks::new(),
        }
    }

    /// The per-branch lock registry, shared with the reconcile policy.
    pub fn locks(&self) -> BranchLocks {
        self.locks.clone()
    }

    pub fn table(&self) -> Arc<Mutex<WorkstreamTable>> {
        Arc::clone(&self.table)
    }

    fn persist(&self) -> Result<(), DomainError> {
        let snapshot = self.table.lock().to_snapshot();
        self.store
            .save(&snapshot)
            .map_err(|e| DomainError::state(format!("failed to persist state: {}", e)))
    }

    /// Resolve `name` (a branch) to its workstream, or a precondition
    /// error naming it.
    fn lookup(&self, name: &str) -> Result<Workstream, DomainError> {
        self.table
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| DomainError::precondition(format!("no workstream named '{}'", name)))
    }

    /// The command run in a workstream's pane: an interactive exec of
    /// the agent inside the container. The session id lets a later
    /// `resume` re-attach the same agent session.
    fn agent_exec_command(
        &self,
        container: &str,
        runtime: &str,
        session_id: Option<&str>,
        prompt: &str,
    ) -> String {
        let mut cmd = format!(
            "docker exec -it {} {} --dangerously-skip-permissions",
            container, runtime
        );
        if let Some(session_id) = session_id {
            cmd.push_str(&format!(" --session-id {}", session_id));
        }
        if !prompt.is_empty() {
            cmd.push_str(&format!(" {}", shell_quote(prompt)));
        }
        cmd
    }

    /// Same as [`agent_exec_command`] but resuming a recorded agent
    /// session.
    fn agent_resume_command(&self, container: &str, runtime: &str, session_id: &str) -> String {
        format!(
            "docker exec -it {} {} --dangerously-skip-permissions --resume {}",
            container, runtime, session_id
        )
    }

    // ------------------------------------------------------------------
    // create
    // ------------------------------------------------------------------

    /// Create a workstream: branch + worktree + container + pane.
    ///
    /// Serialized per branch; cross-branch creates run in parallel.
    pub async fn create(&self, opts: CreateOptions) -> Result<CreateOutcome, DomainError> {
        validate_branch_name(&opts.branch)
            .map_err(|e| DomainError::precondition(e.to_string()))?;

        let _guard = self.locks.lock(&opts.branch).await;

        if self.table.lock().is_branch_active(&opts.branch) {
            return Err(DomainError::precondition(format!(
                "workstream for branch '{}' already exists",
                opts.branch
            )));
        }

        let validation = self.deps.engine.validate_prerequisites().await;
        if !validation.ok {
            return Err(DomainError::precondition(format!(
                "container engine unavailable: {}",
                validation.problems.join("; ")
            )));
        }

        let tag = image_tag(DOCKERFILE.as_bytes());
        self.deps
            .engine
            .ensure_image(&tag, DOCKERFILE.as_bytes(), IMAGE_BUILD_TIMEOUT)
            .await
            .map_err(|e| DomainError::precondition(format!("image build failed: {}", e)))?;

        match self.create_steps(&opts, &tag).await {
            Ok(outcome) => Ok(outcome),
            Err((err, compensations)) => {
                self.compensate(&opts.branch, compensations).await;
                Err(err)
            }
        }
    }

    /// The compensated step sequence of `create`. On failure, returns
    /// the error plus the compensations for every completed step.
    async fn create_steps(
        &self,
        opts: &CreateOptions,
        image: &str,
    ) -> Result<CreateOutcome, (DomainError, Vec<Compensation>)> {
        let mut comps: Vec<Compensation> = Vec::new();
        let branch = &opts.branch;

        // Step 1: reserve the branch in the state store.
        {
            let mut table = self.table.lock();
            let id = table.next_id();
            let mut ws = Workstream::reserve(id, branch.clone(), &opts.prompt, &opts.runtime);
            ws.title = opts.title.clone();
            table.upsert(ws);
        }
        if let Err(e) = self.persist() {
            return Err((e, comps));
        }
        comps.push(Compensation::RemoveEntry {
            branch: branch.clone(),
        });

        // Step 2: create the worktree on a fresh branch off base.
        let worktree = self
            .config
            .worktrees_root
            .join(branch::sanitize_worktree_dir(branch));
        let base = match self.deps.git.base_branch(&self.config.repo_root).await {
            Ok(base) => base,
            Err(e) => return Err((DomainError::adapter(e.to_string()), comps)),
        };
        if let Err(e) = self
            .deps
            .git
            .add_worktree(&self.config.repo_root, &worktree, branch, &base)
            .await
        {
            return Err((DomainError::adapter(e.to_string()), comps));
        }
        comps.push(Compensation::RemoveWorktree {
            path: worktree.clone(),
            branch: branch.clone(),
        });

        // Step 3: copy requested untracked files (idempotent on re-run).
        if opts.copy_untracked {
            if let Err(e) = copy_untracked(&self.config.repo_root, &worktree, &opts.untracked_files)
            {
                return Err((
                    DomainError::adapter(format!("untracked copy failed: {}", e)),
                    comps,
                ));
            }
        }

        // Step 4: create the container.
        let container_name = naming::container_name(&self.config.repo_slug, branch);
        let spec = ContainerSpec {
            image: image.to_string(),
            name: container_name.clone(),
            labels: vec![
                (LABEL_REPOSITORY_ID.into(), self.config.repo_id.clone()),
                (LABEL_WORKSTREAM_ID.into(), branch.clone()),
            ],
            binds: vec![(worktree.clone(), "/workspace".into())],
            env: vec![],
            workdir: "/workspace".into(),
        };
        let container_id = match self.deps.engine.create_container(&spec).await {
            Ok(id) => id,
            Err(e) => return Err((DomainError::adapter(e.to_string()), comps)),
        };
        comps.push(Compensation::RemoveContainer {
            id: container_id.clone(),
        });

        // Step 5: start it.
        if let Err(e) = self.deps.engine.start(&container_id).await {
            return Err((DomainError::adapter(e.to_string()), comps));
        }
        // Replace the plain remove with stop+remove now that it runs.
        comps.pop();
        comps.push(Compensation::StopAndRemoveContainer {
            id: container_id.clone(),
        });

        // Step 6: give the workstream a pane.
        let agent_session_id = UuidIdGen.next();
        let mut pane_id = None;
        if !opts.skip_pane {
            let command = self.agent_exec_command(
                &container_name,
                &opts.runtime,
                Some(&agent_session_id),
                &opts.prompt,
            );
            let id = match self.place_pane(&command).await {
                Ok(id) => id,
                Err(e) => return Err((e, comps)),
            };
            comps.push(Compensation::KillPane { id: id.clone() });

            let border = if opts.title.is_empty() {
                branch.clone()
            } else {
                opts.title.clone()
            };
            let meta = [
                (OPT_WORKSTREAM, branch.as_str()),
                (OPT_CONTAINER, container_name.as_str()),
                (OPT_BORDER_TEXT, border.as_str()),
                (OPT_STATUS, "running"),
            ];
            for (key, value) in meta {
                if let Err(e) = self.deps.mux.set_pane_option(&id, key, value).await {
                    return Err((DomainError::adapter(e.to_string()), comps));
                }
            }

            self.spawn_bypass_watchdog(id.clone());
            pane_id = Some(id);
        }

        // Step 7: promote to running and persist.
        {
            let mut table = self.table.lock();
            if let Some(ws) = table.get_mut(branch) {
                ws.worktree_path = worktree;
                ws.container_id = container_name.clone();
                ws.pane_id = pane_id;
                ws.agent_session_id = agent_session_id;
                ws.status = WorkstreamStatus::Running;
            }
        }
        if let Err(e) = self.persist() {
            return Err((e, comps));
        }

        tracing::info!(branch = %branch, container = %container_name, "workstream created");
        Ok(CreateOutcome {
            branch: branch.clone(),
            container: container_name,
        })
    }

    /// Place the agent pane: respawn the sole placeholder pane (no
    /// `@workstream` metadata) when the session has exactly one, else
    /// split the window and re-tile.
    async fn place_pane(&self, command: &str) -> Result<String, DomainError> {
        let session = &self.config.session;
        let panes = self
            .deps
            .mux
            .list_panes(session)
            .await
            .map_err(|e| DomainError::adapter(e.to_string()))?;

        if panes.len() == 1 {
            let sole = &panes[0];
            let claimed = self
                .deps
                .mux
                .get_pane_option(&sole.id, OPT_WORKSTREAM)
                .await
                .map_err(|e| DomainError::adapter(e.to_string()))?;
            if claimed.is_none() {
                self.deps
                    .mux
                    .respawn_pane(&sole.id, command)
                    .await
                    .map_err(|e| DomainError::adapter(e.to_string()))?;
                return Ok(sole.id.clone());
            }
        }

        let id = self
            .deps
            .mux
            .split_window(session, command)
            .await
            .map_err(|e| DomainError::adapter(e.to_string()))?;
        if let Err(e) = self.deps.mux.select_layout(session, "tiled").await {
            tracing::warn!(error = %e, "select-layout failed after split");
        }
        Ok(id)
    }

    /// Watch a fresh agent pane for the "bypass permissions"
    /// confirmation dialog and accept it. Fallback for agent builds
    /// where the in-container settings flag is unreliable.
    fn spawn_bypass_watchdog(&self, pane_id: String) {
        let mux = self.deps.mux.clone();
        tokio::spawn(async move {
            let deadline = tokio::time::Instant::now() + BYPASS_PROMPT_WINDOW;
            while tokio::time::Instant::now() < deadline {
                tokio::time::sleep(BYPASS_POLL_INTERVAL).await;
                let output = match mux.capture_pane(&pane_id, 50).await {
                    Ok(out) => out,
                    Err(_) => return, // pane gone, nothing to do
                };
                if output.contains("Bypass Permissions mode")
                    && output.contains("1. No")
                    && output.contains("2. Yes")
                {
                    tracing::info!(pane = %pane_id, "accepting bypass permissions prompt");
                    if let Err(e) = mux.send_keys(&pane_id, &["2"]).await {
                        tracing::warn!(pane = %pane_id, error = %e, "failed to accept prompt");
                    }
                    return;
                }
            }
        });
    }

    /// Run recorded compensations in reverse order. Each is
    /// best-effort: a failed compensation is logged and the rest still
    /// run; if any fail, the entry is demoted to `failed` instead of
    /// removed so the remnant stays visible.
    async fn compensate(&self, branch: &str, comps: Vec<Compensation>) {
        let mut entry_removed = false;
        let mut clean = true;

        for comp in comps.into_iter().rev() {
            match comp {
                Compensation::KillPane { id } => {
                    if let Err(e) = self.deps.mux.kill_pane(&id).await {
                        tracing::warn!(pane = %id, error = %e, "compensation: kill-pane failed");
                        clean = false;
                    }
                }
                Compensation::StopAndRemoveContainer { id } => {
                    if let Err(e) = self.deps.engine.stop(&id, STOP_GRACE).await {
                        tracing::warn!(container = %id, error = %e, "compensation: stop failed");
                    }
                    if let Err(e) = self.deps.engine.remove(&id, true).await {
                        tracing::warn!(container = %id, error = %e, "compensation: remove failed");
                        clean = false;
                    }
                }
                Compensation::RemoveContainer { id } => {
                    if let Err(e) = self.deps.engine.remove(&id, true).await {
                        tracing::warn!(container = %id, error = %e, "compensation: remove failed");
                        clean = false;
                    }
                }
                Compensation::RemoveWorktree { path, branch } => {
                    if let Err(e) = self
                        .deps
                        .git
                        .remove_worktree(&self.config.repo_root, &path)
                        .await
                    {
                        tracing::warn!(path = %path.display(), error = %e, "compensation: worktree remove failed");
                        clean = false;
                    }
                    // worktree add created the branch; drop it too so a
                    // retried create starts clean.
                    if let Err(e) = self.deps.git.delete_branch(&self.config.repo_root, &branch).await
                    {
                        tracing::debug!(branch = %branch, error = %e, "compensation: branch delete failed");
                    }
                }
                Compensation::RemoveEntry { branch } => {
                    if clean {
                        self.table.lock().remove(&branch);
                        entry_removed = true;
                    }
                }
            }
        }

        if !entry_removed {
            if let Some(ws) = self.table.lock().get_mut(branch) {
                ws.status = WorkstreamStatus::Failed;
            }
        }
        if let Err(e) = self.persist() {
            tracing::error!(error = %e, "failed to persist state after compensation");
        }
    }

    // ------------------------------------------------------------------
    // destroy
    // ------------------------------------------------------------------

    /// Tear a workstream down. Best-effort: every step runs, errors
    /// accumulate, and the state entry is removed regardless.
    pub async fn destroy(&self, name: &str, opts: DestroyOptions) -> Result<(), DomainError> {
        let _guard = self.locks.lock(name).await;
        let ws = self.lookup(name)?;
        let mut errors: Vec<String> = Vec::new();

        {
            let mut table = self.table.lock();
            if let Some(entry) = table.get_mut(name) {
                entry.status = WorkstreamStatus::Destroying;
            }
        }

        // 1. Pane.
        let pane_id = match ws.pane_id.clone() {
            Some(id) => Some(id),
            None => self.find_pane_for(name).await,
        };
        if let Some(pane) = pane_id {
            if let Err(e) = self.deps.mux.kill_pane(&pane).await {
                errors.push(format!("kill pane: {}", e));
            }
        }

        // 2. Container: stop errors do not skip remove.
        if !ws.container_id.is_empty() {
            if let Err(e) = self.deps.engine.stop(&ws.container_id, STOP_GRACE).await {
                errors.push(format!("stop container: {}", e));
            }
            if let Err(e) = self.deps.engine.remove(&ws.container_id, true).await {
                errors.push(format!("remove container: {}", e));
            }
        }

        // 3. Worktree.
        if !opts.keep_worktree && !ws.worktree_path.as_os_str().is_empty() {
            if let Err(e) = self
                .deps
                .git
                .remove_worktree(&self.config.repo_root, &ws.worktree_path)
                .await
            {
                errors.push(format!("remove worktree: {}", e));
            }
        }

        // 4. Branch.
        if opts.delete_branch {
            if let Err(e) = self
                .deps
                .git
                .delete_branch(&self.config.repo_root, &ws.branch_name)
                .await
            {
                errors.push(format!("delete branch: {}", e));
            }
        }

        // 5. Entry goes away no matter what happened above.
        self.table.lock().remove(name);
        if let Err(e) = self.persist() {
            errors.push(e.to_string());
        }

        if errors.is_empty() {
            tracing::info!(branch = %name, "workstream destroyed");
            Ok(())
        } else {
            Err(DomainError::adapter(format!(
                "destroy completed with errors: {}",
                errors.join("; ")
            )))
        }
    }

    /// Destroy every workstream in state. Best-effort; returns the
    /// number destroyed cleanly and the accumulated errors.
    pub async fn destroy_all(&self, opts: DestroyOptions) -> (usize, Vec<String>) {
        let branches = self.table.lock().branches();
        let mut ok = 0;
        let mut errors = Vec::new();
        for branch in branches {
            match self.destroy(&branch, opts).await {
                Ok(()) => ok += 1,
                Err(e) => errors.push(format!("{}: {}", branch, e)),
            }
        }
        (ok, errors)
    }

    /// Find the pane whose `@workstream` metadata names `branch`.
    async fn find_pane_for(&self, branch: &str) -> Option<String> {
        let panes = self.deps.mux.list_panes(&self.config.session).await.ok()?;
        for pane in panes {
            let claimed = self
                .deps
                .mux
                .get_pane_option(&pane.id, OPT_WORKSTREAM)
                .await
                .ok()
                .flatten();
            if claimed.as_deref() == Some(branch) {
                return Some(pane.id);
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // pause / resume / rebuild
    // ------------------------------------------------------------------

    /// Freeze a running workstream's container.
    pub async fn pause(&self, name: &str) -> Result<(), DomainError> {
        let _guard = self.locks.lock(name).await;
        let ws = self.lookup(name)?;
        if ws.status != WorkstreamStatus::Running {
            return Err(DomainError::precondition(format!(
                "workstream '{}' is {}, not running",
                name, ws.status
            )));
        }

        self.deps
            .engine
            .pause(&ws.container_id)
            .await
            .map_err(|e| DomainError::adapter(e.to_string()))?;

        if let Some(pane) = &ws.pane_id {
            let _ = self.deps.mux.set_pane_option(pane, OPT_STATUS, "paused").await;
        }

        if let Some(entry) = self.table.lock().get_mut(name) {
            entry.status = WorkstreamStatus::Paused;
        }
        self.persist()
    }

    /// Unfreeze a paused workstream and restore its agent session in
    /// the pane when one was recorded.
    pub async fn resume(&self, name: &str) -> Result<(), DomainError> {
        let _guard = self.locks.lock(name).await;
        let ws = self.lookup(name)?;
        if ws.status != WorkstreamStatus::Paused {
            return Err(DomainError::precondition(format!(
                "workstream '{}' is {}, not paused",
                name, ws.status
            )));
        }

        self.deps
            .engine
            .unpause(&ws.container_id)
            .await
            .map_err(|e| DomainError::adapter(e.to_string()))?;

        let pane = match ws.pane_id.clone() {
            Some(id) => Some(id),
            None => self.find_pane_for(name).await,
        };
        if let Some(pane) = pane {
            if validate_agent_session_id(&ws.agent_session_id) {
                let command = self.agent_resume_command(
                    &ws.container_id,
                    &ws.runtime,
                    &ws.agent_session_id,
                );
                if let Err(e) = self.deps.mux.respawn_pane(&pane, &command).await {
                    tracing::warn!(pane = %pane, error = %e, "failed to respawn agent on resume");
                }
            } else if !ws.agent_session_id.is_empty() {
                tracing::warn!(
                    branch = %name,
                    "recorded agent session id is malformed, skipping resume"
                );
            }
            let _ = self.deps.mux.set_pane_option(&pane, OPT_STATUS, "running").await;
        }

        if let Some(entry) = self.table.lock().get_mut(name) {
            entry.status = WorkstreamStatus::Running;
        }
        self.persist()
    }

    /// Replace a workstream's container, preserving branch and
    /// worktree. The pane is respawned onto the new container.
    pub async fn rebuild(&self, name: &str) -> Result<CreateOutcome, DomainError> {
        let _guard = self.locks.lock(name).await;
        let ws = self.lookup(name)?;
        if ws.worktree_path.as_os_str().is_empty() {
            return Err(DomainError::precondition(format!(
                "workstream '{}' has no worktree to rebuild onto",
                name
            )));
        }

        // Old container goes away; errors only block if the new one
        // cannot take its name.
        if !ws.container_id.is_empty() {
            if let Err(e) = self.deps.engine.stop(&ws.container_id, STOP_GRACE).await {
                tracing::warn!(container = %ws.container_id, error = %e, "rebuild: stop failed");
            }
            if let Err(e) = self.deps.engine.remove(&ws.container_id, true).await {
                tracing::warn!(container = %ws.container_id, error = %e, "rebuild: remove failed");
            }
        }

        let tag = image_tag(DOCKERFILE.as_bytes());
        self.deps
            .engine
            .ensure_image(&tag, DOCKERFILE.as_bytes(), IMAGE_BUILD_TIMEOUT)
            .await
            .map_err(|e| DomainError::precondition(format!("image build failed: {}", e)))?;

        let container_name = naming::container_name(&self.config.repo_slug, name);
        let spec = ContainerSpec {
            image: tag,
            name: container_name.clone(),
            labels: vec![
                (LABEL_REPOSITORY_ID.into(), self.config.repo_id.clone()),
                (LABEL_WORKSTREAM_ID.into(), name.to_string()),
            ],
            binds: vec![(ws.worktree_path.clone(), "/workspace".into())],
            env: vec![],
            workdir: "/workspace".into(),
        };
        let _container_id = self
            .deps
            .engine
            .create_container(&spec)
            .await
            .map_err(|e| DomainError::adapter(e.to_string()))?;
        self.deps
            .engine
            .start(&container_name)
            .await
            .map_err(|e| DomainError::adapter(e.to_string()))?;

        let pane = match ws.pane_id.clone() {
            Some(id) => Some(id),
            None => self.find_pane_for(name).await,
        };
        if let Some(pane) = &pane {
            let command = self.agent_exec_command(&container_name, &ws.runtime, None, "");
            if let Err(e) = self.deps.mux.respawn_pane(pane, &command).await {
                tracing::warn!(pane = %pane, error = %e, "rebuild: respawn failed");
            }
            let _ = self
                .deps
                .mux
                .set_pane_option(pane, OPT_CONTAINER, &container_name)
                .await;
            let _ = self.deps.mux.set_pane_option(pane, OPT_STATUS, "running").await;
        }

        {
            let mut table = self.table.lock();
            if let Some(entry) = table.get_mut(name) {
                entry.container_id = container_name.clone();
                entry.pane_id = pane;
                entry.status = WorkstreamStatus::Running;
            }
        }
        self.persist()?;

        tracing::info!(branch = %name, container = %container_name, "workstream rebuilt");
        Ok(CreateOutcome {
            branch: name.to_string(),
            container: container_name,
        })
    }
}

/// Single-quote a string for inclusion in a shell command line.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

#[cfg(test)]
#[path = "orchestrator_tests/mod.rs"]
mod tests;
