// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, tickers, shutdown.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ccells_adapters::{ContainerEngine, GitAdapter, MuxAdapter, NotifyAdapter};
use ccells_core::naming;
use ccells_engine::{
    Orchestrator, OrchestratorConfig, OrchestratorDeps, PairingProvider, ReconcilePolicy,
};
use ccells_storage::{LockError, LockFile, StateStore, WorkstreamTable};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::listener::{ListenCtx, Listener};

/// Daemon configuration: one state directory per repository.
#[derive(Debug, Clone)]
pub struct Config {
    /// Repository served by this daemon.
    pub repo_root: PathBuf,
    /// Per-repository state directory.
    pub state_dir: PathBuf,
    /// Path to the Unix socket.
    pub socket_path: PathBuf,
    /// Path to the daemon log file.
    pub log_path: PathBuf,
    /// Directory worktrees are created under.
    pub worktrees_path: PathBuf,
    /// Multiplexer session name.
    pub session: String,
    /// Stable repository identifier.
    pub repo_id: String,
    /// Human-readable repository slug.
    pub repo_slug: String,
}

impl Config {
    /// Configuration for the daemon serving `repo_root`.
    pub fn for_repo(repo_root: &Path) -> Self {
        let repo_id = naming::repo_id(repo_root);
        let state_dir = crate::env::state_root().join(&repo_id);
        Self {
            repo_root: repo_root.to_path_buf(),
            socket_path: state_dir.join("daemon.sock"),
            log_path: state_dir.join("daemon.log"),
            worktrees_path: state_dir.join("worktrees"),
            session: naming::session_name(&repo_id),
            repo_slug: naming::repo_slug(repo_root),
            repo_id,
            state_dir,
        }
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("{0}")]
    Lock(#[from] LockError),

    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("state error: {0}")]
    Store(#[from] ccells_storage::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A started daemon: signal [`DaemonHandle::shutdown`] (or send the
/// `shutdown` action over the socket) and then [`DaemonHandle::wait`]
/// for teardown to finish.
#[derive(Debug)]
pub struct DaemonHandle {
    pub socket_path: PathBuf,
    pub shutdown: Arc<Notify>,
    join: JoinHandle<()>,
}

impl DaemonHandle {
    /// Ask the daemon to stop.
    pub fn trigger_shutdown(&self) {
        self.shutdown.notify_waiters();
        self.shutdown.notify_one();
    }

    /// Wait for the daemon to finish tearing down.
    pub async fn wait(self) {
        if let Err(e) = self.join.await {
            warn!(error = %e, "daemon task ended abnormally");
        }
    }
}

/// Start the daemon: acquire the lock, load state, bind the socket,
/// spawn the listener and tickers. Returns once the socket is live.
pub async fn start<M, E, G, N>(
    config: Config,
    mux: M,
    engine: E,
    git: G,
    notify: N,
    pairing: Option<Arc<dyn PairingProvider>>,
) -> Result<DaemonHandle, LifecycleError>
where
    M: MuxAdapter,
    E: ContainerEngine,
    G: GitAdapter,
    N: NotifyAdapter,
{
    std::fs::create_dir_all(&config.state_dir)?;

    // Lock first: everything else belongs to whoever holds it.
    let lock = LockFile::acquire(&config.state_dir)?;

    // Load (or quarantine-and-refresh) the snapshot.
    let store = StateStore::new(&config.state_dir);
    let snapshot = store.load()?;
    info!(
        workstreams = snapshot.workstreams.len(),
        "loaded state snapshot"
    );
    let table = Arc::new(Mutex::new(WorkstreamTable::from_snapshot(snapshot)));

    let orchestrator = Orchestrator::new(
        OrchestratorDeps {
            mux: mux.clone(),
            engine: engine.clone(),
            git,
        },
        OrchestratorConfig {
            repo_root: config.repo_root.clone(),
            repo_id: config.repo_id.clone(),
            repo_slug: config.repo_slug.clone(),
            session: config.session.clone(),
            worktrees_root: config.worktrees_path.clone(),
        },
        store.clone(),
        Arc::clone(&table),
    );
    let locks = orchestrator.locks();

    // Bind last, after everything the handlers need exists. A stale
    // socket file from a crashed daemon is removed first; the lock
    // file already proved no live daemon owns it.
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let socket = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;
    set_socket_mode(&config.socket_path);

    let shutdown = Arc::new(Notify::new());
    let ctx = Arc::new(ListenCtx {
        orchestrator,
        pairing: pairing.clone(),
        shutdown: Arc::clone(&shutdown),
        start_time: std::time::Instant::now(),
    });

    let policy = ReconcilePolicy::new(
        mux,
        engine,
        notify,
        store,
        table,
        locks,
        config.session.clone(),
        config.repo_id.clone(),
    );

    // Bridge the edge-triggered Notify into a level-holding watch
    // channel: a ticker that is mid-tick when the signal fires still
    // observes it on its next loop.
    let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            shutdown.notified().await;
            let _ = stop_tx.send(true);
        });
    }

    let listener = Listener::new(socket, Arc::clone(&ctx), stop_rx.clone());
    let listener_task = tokio::spawn(listener.run());
    let reconcile_task = spawn_reconcile_ticker(policy, stop_rx.clone());
    let pairing_task = pairing.map(|p| spawn_pairing_ticker(p, stop_rx));

    info!(socket = %config.socket_path.display(), "daemon ready");

    let socket_path = config.socket_path.clone();
    let join = tokio::spawn(async move {
        // The listener owns connection draining; it exits after the
        // shutdown signal and the grace window.
        if let Err(e) = listener_task.await {
            warn!(error = %e, "listener task panicked");
        }
        if let Err(e) = reconcile_task.await {
            warn!(error = %e, "reconcile ticker ended abnormally");
        }
        if let Some(task) = pairing_task {
            if let Err(e) = task.await {
                warn!(error = %e, "pairing ticker ended abnormally");
            }
        }

        if config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&config.socket_path) {
                warn!(error = %e, "failed to remove socket file");
            }
        }
        lock.release();
        info!("daemon stopped");
    });

    Ok(DaemonHandle {
        socket_path,
        shutdown,
        join,
    })
}

/// Reconciliation ticker: apply the policy every interval until
/// shutdown. Failures inside the tick are logged by the policy itself.
fn spawn_reconcile_ticker<M, E, N>(
    policy: ReconcilePolicy<M, E, N>,
    mut stop: tokio::sync::watch::Receiver<bool>,
) -> JoinHandle<()>
where
    M: MuxAdapter,
    E: ContainerEngine,
    N: NotifyAdapter,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(crate::env::reconcile_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick fires immediately; skip it so startup stays
        // responsive and the session has a chance to settle.
        interval.tick().await;
        loop {
            if *stop.borrow() {
                break;
            }
            tokio::select! {
                _ = interval.tick() => {
                    let report = policy.run_once().await;
                    if report != Default::default() {
                        info!(?report, "reconcile tick");
                    }
                }
                _ = stop.changed() => break,
            }
        }
    })
}

/// Pairing-health ticker: run a sync pass every interval while
/// pairing is active.
fn spawn_pairing_ticker(
    provider: Arc<dyn PairingProvider>,
    mut stop: tokio::sync::watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(crate::env::pairing_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        interval.tick().await;
        loop {
            if *stop.borrow() {
                break;
            }
            tokio::select! {
                _ = interval.tick() => {
                    if !provider.is_active() {
                        continue;
                    }
                    if let Err(e) = provider.check_health().await {
                        warn!(error = %e, "pairing health check failed");
                    }
                }
                _ = stop.changed() => break,
            }
        }
    })
}

#[cfg(unix)]
fn set_socket_mode(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
        warn!(error = %e, "failed to set socket mode");
    }
}

#[cfg(not(unix))]
fn set_socket_mode(_path: &Path) {}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
pub(crate) mod tests;
