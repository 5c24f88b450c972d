// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ccells: parallel AI-coding workstreams, one pane each.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;
mod dialogs;
mod exit;
mod repo;
mod title;
mod wait;

use clap::{Parser, Subcommand};
use exit::ExitError;

/// CLI version string: crate version plus build hash.
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH"));

#[derive(Parser)]
#[command(
    name = "ccells",
    version = VERSION,
    about = "Run parallel AI-coding agents, each in its own branch, worktree, and container"
)]
struct Cli {
    /// Agent runtime (claude, codex, opencode); overrides config files
    #[arg(long, global = true)]
    runtime: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bring up the session: daemon, panes, and attach
    Up,
    /// Attach to an existing session
    Attach,
    /// Shut the daemon down; --rm also destroys all workstreams
    Down {
        #[arg(long)]
        rm: bool,
    },
    /// Create a workstream from a prompt
    Create {
        /// Prompt for the agent; omit for the interactive dialog
        prompt: Vec<String>,
        /// Branch name; derived from the prompt when omitted
        #[arg(long)]
        branch: Option<String>,
        /// Copy untracked files from the working copy into the worktree
        #[arg(long)]
        copy_untracked: bool,
    },
    /// Destroy a workstream
    Rm {
        name: String,
        /// Also delete the git branch
        #[arg(long)]
        delete_branch: bool,
    },
    /// Pause a workstream's container
    Pause { name: String },
    /// Unpause a workstream's container
    Unpause { name: String },
    /// Recreate a workstream's container, keeping branch and worktree
    Rebuild { name: String },
    /// List workstreams
    Ps,
    /// Show recent pane output of a workstream
    Logs { name: String },
    /// Pair your local working copy with a workstream's container
    Pair { name: String },
    /// Stop pairing
    Unpair,
    /// Show daemon and workstream status
    Status,
    /// Push a workstream's branch and open (or merge) its PR
    Merge {
        name: String,
        /// Merge the PR instead of just creating it
        #[arg(long)]
        merge: bool,
    },
    /// First-run welcome dialog (runs inside the initial pane)
    #[command(hide = true)]
    Welcome,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version print through clap with exit code 0.
            if e.use_stderr() {
                eprintln!("{e}");
                std::process::exit(1);
            }
            let _ = e.print();
            std::process::exit(0);
        }
    };

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("ccells: failed to start async runtime: {e}");
        std::process::exit(4);
    });

    let result = runtime.block_on(dispatch(cli));
    if let Err(e) = result {
        eprintln!("ccells: {e}");
        std::process::exit(e.code());
    }
}

async fn dispatch(cli: Cli) -> Result<(), ExitError> {
    let runtime_flag = cli.runtime.as_deref();
    match cli.command {
        Command::Up => commands::up::up(runtime_flag).await,
        Command::Attach => commands::up::attach().await,
        Command::Down { rm } => commands::up::down(rm).await,
        Command::Create {
            prompt,
            branch,
            copy_untracked,
        } => {
            let prompt = prompt.join(" ");
            if prompt.is_empty() {
                dialogs::create_dialog(runtime_flag).await
            } else {
                commands::workstream::create(
                    &prompt,
                    branch.as_deref(),
                    runtime_flag,
                    copy_untracked,
                )
                .await
            }
        }
        Command::Rm { name, delete_branch } => {
            commands::workstream::rm(&name, delete_branch).await
        }
        Command::Pause { name } => commands::workstream::pause(&name).await,
        Command::Unpause { name } => commands::workstream::unpause(&name).await,
        Command::Rebuild { name } => commands::workstream::rebuild(&name).await,
        Command::Ps => commands::workstream::ps().await,
        Command::Logs { name } => commands::workstream::logs(&name).await,
        Command::Pair { name } => commands::pair::pair(&name).await,
        Command::Unpair => commands::pair::unpair().await,
        Command::Status => commands::status::status().await,
        Command::Merge { name, merge } => commands::merge::merge(&name, merge).await,
        Command::Welcome => dialogs::welcome(runtime_flag).await,
    }
}
