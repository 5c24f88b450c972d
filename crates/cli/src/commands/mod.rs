// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations.

pub mod merge;
pub mod pair;
pub mod status;
pub mod up;
pub mod workstream;

use crate::client::DaemonClient;
use crate::exit::ExitError;
use ccells_daemon::Config;

/// Daemon config for the repository containing the cwd.
pub fn config_here() -> Result<Config, ExitError> {
    let root = crate::repo::discover_repo_root()?;
    Ok(Config::for_repo(&root))
}

/// Client for this repository's daemon, failing with exit code 3 when
/// it isn't running.
pub fn client_here() -> Result<(Config, DaemonClient), ExitError> {
    let config = config_here()?;
    let client = DaemonClient::connect(&config.socket_path)?;
    Ok((config, client))
}
