// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ccells status`: daemon reachability, workstream counts, pairing.

use super::{client_here, config_here};
use crate::client::DaemonClient;
use crate::exit::ExitError;
use ccells_core::format_elapsed;
use ccells_daemon::protocol::Request;

pub async fn status() -> Result<(), ExitError> {
    let config = config_here()?;

    let client = match DaemonClient::connect(&config.socket_path) {
        Ok(client) => client,
        Err(_) => {
            println!("daemon:      not running");
            println!("state dir:   {}", config.state_dir.display());
            println!("session:     {}", config.session);
            return Ok(());
        }
    };

    if client.ping().await.is_err() {
        println!("daemon:      socket present but unresponsive");
        return Ok(());
    }

    let data = client
        .send_expecting_data(&Request::Ps, crate::client::timeout_ipc())
        .await?;

    let uptime = data["uptime_secs"].as_u64().unwrap_or(0);
    println!("daemon:      running (up {})", format_elapsed(uptime));
    println!("socket:      {}", config.socket_path.display());
    println!("session:     {}", config.session);
    let empty = Vec::new();
    let workstreams = data["workstreams"].as_array().unwrap_or(&empty);
    println!("workstreams: {}", workstreams.len());
    for ws in workstreams {
        println!(
            "  {} [{}]",
            ws["branch_name"].as_str().unwrap_or("?"),
            ws["status"].as_str().unwrap_or("?"),
        );
    }

    if let Ok((_, client)) = client_here() {
        if let Ok(state) = client
            .send_expecting_data(&Request::PairStatus, crate::client::timeout_ipc())
            .await
        {
            if state["active"].as_bool() == Some(true) {
                println!(
                    "pairing:     {} ({})",
                    state["branch"].as_str().unwrap_or("?"),
                    state["status_text"].as_str().unwrap_or(""),
                );
            }
        }
    }

    Ok(())
}
