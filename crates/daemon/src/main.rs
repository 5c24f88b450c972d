// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ccells daemon (ccellsd)
//!
//! Standalone entry point for the coordinator daemon. `ccells up`
//! normally runs the daemon in-process and attaches the user to the
//! multiplexer session; this binary exists for headless operation and
//! for the behavioral specs, which drive the daemon over its socket
//! without a terminal.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::path::PathBuf;

use ccells_adapters::{DesktopNotifyAdapter, DockerEngine, GitCliAdapter, TmuxAdapter};
use ccells_daemon::lifecycle::{self, Config};
use ccells_daemon::VERSION;
use ccells_engine::SyncPairingProvider;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut repo_root: Option<PathBuf> = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("ccellsd {}", VERSION);
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            "--repo" => {
                repo_root = args.next().map(PathBuf::from);
                if repo_root.is_none() {
                    eprintln!("error: --repo requires a path");
                    std::process::exit(1);
                }
            }
            other => {
                eprintln!("error: unexpected argument '{other}'");
                eprintln!("Usage: ccellsd [--repo <path>] [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let repo_root = match repo_root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let config = Config::for_repo(&repo_root);

    rotate_log_if_needed(&config.log_path);
    let _log_guard = setup_logging(&config)?;

    info!(repo = %repo_root.display(), "starting daemon");

    let engine = DockerEngine::new();
    let pairing = Arc::new(SyncPairingProvider::new(engine.clone()));
    let handle = match lifecycle::start(
        config,
        TmuxAdapter::new(),
        engine,
        GitCliAdapter::new(),
        DesktopNotifyAdapter::new(),
        Some(pairing),
    )
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("failed to start daemon: {}", e);
            eprintln!("ccellsd: {e}");
            std::process::exit(2);
        }
    };

    // Signal ready for the parent process waiting on startup.
    println!("READY");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let shutdown = handle.shutdown.clone();
    tokio::select! {
        _ = sigterm.recv() => {
            info!("received SIGTERM, shutting down");
            shutdown.notify_waiters();
            shutdown.notify_one();
        }
        _ = sigint.recv() => {
            info!("received SIGINT, shutting down");
            shutdown.notify_waiters();
            shutdown.notify_one();
        }
        _ = shutdown.notified() => {
            info!("shutdown requested via socket");
        }
    }

    handle.wait().await;
    Ok(())
}

fn print_help() {
    println!("ccellsd {}", VERSION);
    println!("ccells coordinator daemon - reconciles panes, containers, and worktrees");
    println!();
    println!("USAGE:");
    println!("    ccellsd [--repo <path>]");
    println!();
    println!("The daemon is typically started by `ccells up` and should not");
    println!("be invoked directly. It listens on a per-repository Unix socket");
    println!("for commands from `ccells`.");
    println!();
    println!("OPTIONS:");
    println!("        --repo <path>    Repository to serve (default: cwd)");
    println!("    -h, --help           Print help information");
    println!("    -v, --version        Print version information");
}

/// Maximum log file size before rotation (10 MB).
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Number of rotated log files to keep (daemon.log.1, .2, .3).
const MAX_ROTATED_LOGS: u32 = 3;

/// Rotate the daemon log file if it exceeds [`MAX_LOG_SIZE`].
///
/// Shifts `daemon.log` → `daemon.log.1` → `daemon.log.2` → `daemon.log.3`,
/// deleting the oldest. Best-effort: rotation failures are silently ignored
/// so the daemon still starts.
fn rotate_log_if_needed(log_path: &std::path::Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };

    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();

    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }

    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, std::io::Error> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let dir = config
        .log_path
        .parent()
        .ok_or_else(|| std::io::Error::other("log path has no parent"))?;
    let file = config
        .log_path
        .file_name()
        .ok_or_else(|| std::io::Error::other("log path has no file name"))?;
    let file_appender = tracing_appender::rolling::never(dir, file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}
