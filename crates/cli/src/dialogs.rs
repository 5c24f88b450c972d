// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-oriented dialogs run inside the initial session pane.
//!
//! These are ordinary RPC clients of the daemon: they collect input on
//! stdin, send one request over the socket, and get out of the way.
//! When the daemon respawns the placeholder pane with the agent
//! command, the dialog process is replaced mid-wait; that is the
//! expected happy path, not an error.

use crate::commands::workstream;
use crate::exit::ExitError;
use std::io::{BufRead, Write};

pub async fn welcome(runtime_flag: Option<&str>) -> Result<(), ExitError> {
    println!("ccells — parallel AI-coding workstreams");
    println!();
    println!("Each workstream is a branch, a worktree, a container, and this");
    println!("pane. Describe a task to start your first one.");
    println!();
    create_dialog(runtime_flag).await
}

pub async fn create_dialog(runtime_flag: Option<&str>) -> Result<(), ExitError> {
    let prompt = read_prompt()?;
    if prompt.is_empty() {
        println!("nothing to do — run `ccells create <prompt>` when ready");
        park();
    }

    println!("creating workstream…");
    match workstream::create(&prompt, None, runtime_flag, false).await {
        Ok(()) => {
            // If this pane was the placeholder, the daemon has already
            // respawned it and we no longer exist. Reaching this point
            // means the workstream landed in another pane.
            park();
        }
        Err(e) => {
            eprintln!("ccells: {e}");
            eprintln!("press Enter to exit");
            let mut discard = String::new();
            let _ = std::io::stdin().lock().read_line(&mut discard);
            Err(e)
        }
    }
}

fn read_prompt() -> Result<String, ExitError> {
    print!("task> ");
    std::io::stdout()
        .flush()
        .map_err(|e| ExitError::Operation(e.to_string()))?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| ExitError::Operation(e.to_string()))?;
    Ok(line.trim().to_string())
}

/// Hand the pane over to a plain shell. Never returns.
fn park() -> ! {
    use std::os::unix::process::CommandExt;
    let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
    let err = std::process::Command::new(shell).exec();
    // exec only returns on failure.
    eprintln!("ccells: could not start shell: {err}");
    std::process::exit(0);
}
