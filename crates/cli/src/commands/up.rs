// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session controller: `up`, `attach`, `down`.
//!
//! `up` either attaches to an existing session or bootstraps one:
//! create the multiplexer session with the right initial pane command,
//! start the daemon as an in-process task, wait for socket readiness,
//! attach (blocking), and tear the daemon down after detach.

use super::config_here;
use crate::client::DaemonClient;
use crate::exit::ExitError;
use crate::wait::{wait_for_socket, READY_CEILING};
use ccells_adapters::{
    DesktopNotifyAdapter, DockerEngine, GitCliAdapter, MuxAdapter, TmuxAdapter,
};
use ccells_daemon::lifecycle::{self, Config, DaemonHandle, LifecycleError};
use ccells_daemon::protocol::Request;
use ccells_engine::SyncPairingProvider;
use ccells_storage::StateStore;
use std::sync::Arc;

pub async fn up(_runtime_flag: Option<&str>) -> Result<(), ExitError> {
    let config = config_here()?;
    let mux = TmuxAdapter::new();

    mux.version()
        .await
        .map_err(|_| ExitError::Prerequisite("tmux not found on PATH".to_string()))?;

    // An existing session means a coordinator is (or was) running:
    // just attach, and report on the way out.
    if mux.has_session(&config.session).await.unwrap_or(false) {
        attach_session(&mux, &config.session)?;
        print_detach_summary(&config).await;
        return Ok(());
    }

    // Bootstrap. The initial pane runs the welcome dialog on first
    // contact, the create dialog when state exists but is empty, and
    // a plain shell otherwise (the reconciler restores workstreams).
    let store = StateStore::new(&config.state_dir);
    let initial_command = initial_pane_command(&store);
    mux.new_session(&config.session, initial_command.as_deref())
        .await
        .map_err(|e| ExitError::Prerequisite(format!("could not create session: {}", e)))?;
    configure_session(&mux, &config.session).await;

    let handle = start_daemon(&config).await?;

    // The socket should exist already (start binds before returning);
    // the poll covers slow filesystems and keeps the contract honest.
    if !wait_for_socket(&config.socket_path, READY_CEILING).await {
        handle.trigger_shutdown();
        handle.wait().await;
        let _ = mux.kill_server().await;
        return Err(ExitError::Prerequisite(
            "daemon socket never appeared".to_string(),
        ));
    }

    let attach_result = attach_session(&mux, &config.session);

    // Detached (or attach failed): tear the daemon down either way.
    handle.trigger_shutdown();
    handle.wait().await;
    attach_result?;

    print_detach_summary(&config).await;
    Ok(())
}

pub async fn attach() -> Result<(), ExitError> {
    let config = config_here()?;
    let mux = TmuxAdapter::new();
    if !mux.has_session(&config.session).await.unwrap_or(false) {
        return Err(ExitError::Prerequisite(
            "no session for this repository — run `ccells up`".to_string(),
        ));
    }
    attach_session(&mux, &config.session)?;
    print_detach_summary(&config).await;
    Ok(())
}

pub async fn down(rm: bool) -> Result<(), ExitError> {
    let config = config_here()?;

    match DaemonClient::connect(&config.socket_path) {
        Ok(client) => {
            if rm {
                if let Err(e) = client
                    .send_with_timeout(&Request::DestroyAll, crate::client::timeout_create())
                    .await
                {
                    eprintln!("ccells: destroy-all failed: {e}");
                }
            }
            if let Err(e) = client.send(&Request::Shutdown).await {
                eprintln!("ccells: shutdown request failed: {e}");
            }
        }
        Err(_) => {
            println!("daemon not running");
        }
    }

    // The session outlives the daemon unless we take it down too.
    let mux = TmuxAdapter::new();
    if mux.has_session(&config.session).await.unwrap_or(false) {
        let _ = tokio::process::Command::new("tmux")
            .args(["kill-session", "-t", &config.session])
            .output()
            .await;
    }

    println!("down");
    Ok(())
}

/// Pick the initial pane command for a fresh session.
fn initial_pane_command(store: &StateStore) -> Option<String> {
    let exe = std::env::current_exe().ok()?;
    let exe = exe.display();
    if !store.exists() {
        return Some(format!("{} welcome", exe));
    }
    match store.load() {
        Ok(snapshot) if snapshot.is_empty() => Some(format!("{} create", exe)),
        _ => None,
    }
}

/// Start the daemon as an in-process task with production adapters.
async fn start_daemon(config: &Config) -> Result<DaemonHandle, ExitError> {
    let engine = DockerEngine::new();
    let pairing = Arc::new(SyncPairingProvider::new(engine.clone()));
    lifecycle::start(
        config.clone(),
        TmuxAdapter::new(),
        engine,
        GitCliAdapter::new(),
        DesktopNotifyAdapter::new(),
        Some(pairing),
    )
    .await
    .map_err(|e| match e {
        LifecycleError::Lock(lock) => ExitError::Prerequisite(lock.to_string()),
        other => ExitError::Prerequisite(other.to_string()),
    })
}

/// Attach the user to the session; blocks until detach.
fn attach_session(mux: &TmuxAdapter, session: &str) -> Result<(), ExitError> {
    let argv = mux.attach_command(session);
    let status = std::process::Command::new(&argv[0])
        .args(&argv[1..])
        .status()
        .map_err(|e| ExitError::Prerequisite(format!("could not attach: {}", e)))?;
    if !status.success() {
        return Err(ExitError::Operation("attach exited abnormally".to_string()));
    }
    Ok(())
}

/// Cosmetic session setup; failures are ignored.
async fn configure_session(mux: &TmuxAdapter, session: &str) {
    let _ = mux
        .set_session_option(session, "status-left", " ccells ")
        .await;
    let _ = mux
        .set_session_option(session, "pane-border-status", "top")
        .await;
    let _ = mux
        .set_session_option(session, "pane-border-format", " #{@border_text} ")
        .await;
    let _ = mux.set_session_option(session, "mouse", "on").await;
    // A pane whose process dies shows as exited in its border until
    // the reconciler (or the user) deals with it.
    let _ = mux
        .set_hook(
            session,
            "pane-died",
            "set-option -p @status exited",
        )
        .await;
}

/// Printed after the user detaches: daemon state plus the commands to
/// come back or tear down.
async fn print_detach_summary(config: &Config) {
    let running = match DaemonClient::connect(&config.socket_path) {
        Ok(client) => client.ping().await.is_ok(),
        Err(_) => false,
    };
    println!();
    if running {
        println!("detached — daemon still running");
        println!("  resume:    ccells attach");
        println!("  tear down: ccells down [--rm]");
    } else {
        println!("detached — daemon stopped");
        println!("  start again: ccells up");
    }
}
