// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository discovery.

use crate::exit::ExitError;
use std::path::PathBuf;

/// Find the repository root above the current directory.
pub fn discover_repo_root() -> Result<PathBuf, ExitError> {
    let output = std::process::Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .env_remove("GIT_DIR")
        .env_remove("GIT_WORK_TREE")
        .output()
        .map_err(|e| ExitError::Prerequisite(format!("git not available: {}", e)))?;

    if !output.status.success() {
        return Err(ExitError::Prerequisite(
            "not inside a git repository".to_string(),
        ));
    }

    Ok(PathBuf::from(
        String::from_utf8_lossy(&output.stdout).trim(),
    ))
}
