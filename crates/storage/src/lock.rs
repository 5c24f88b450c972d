// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-repository lock file.
//!
//! A single pid-bearing file (`ccells.lock`) guarded by an exclusive
//! advisory lock ensures one coordinator per repository. Stale locks
//! left by dead processes are reaped before acquisition is retried.

use fs2::FileExt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// File name of the lock inside the state directory.
pub const LOCK_FILE: &str = "ccells.lock";

/// Errors from lock acquisition
#[derive(Debug, Error)]
pub enum LockError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("another coordinator is running (pid {0})")]
    Held(u32),
}

/// An acquired lock. The advisory lock is released when this is
/// dropped; the file itself is removed by [`LockFile::release`].
#[derive(Debug)]
pub struct LockFile {
    // NOTE(lifetime): held to maintain the exclusive lock; released on drop
    #[allow(dead_code)]
    file: File,
    path: PathBuf,
}

impl LockFile {
    /// Acquire the repository lock under `dir`, writing our pid.
    ///
    /// Fails fast with [`LockError::Held`] when a live process holds
    /// the lock. A lock file whose pid no longer exists is reaped.
    pub fn acquire(dir: &Path) -> Result<Self, LockError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(LOCK_FILE);

        // Open without truncating so a failed acquisition does not
        // wipe the running coordinator's pid.
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        if file.try_lock_exclusive().is_err() {
            let holder = read_pid(&path);
            match holder {
                Some(pid) if process_exists(pid) => return Err(LockError::Held(pid)),
                _ => {
                    // Advisory lock held but holder unknown or dead —
                    // treat as held to stay on the safe side.
                    return Err(LockError::Held(holder.unwrap_or(0)));
                }
            }
        }

        // We hold the advisory lock; any pid in the file is stale.
        if let Some(pid) = read_pid(&path) {
            if pid != std::process::id() && !process_exists(pid) {
                warn!(stale_pid = pid, "reaping stale lock file");
            }
        }

        let mut file = file;
        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;
        file.sync_all()?;

        Ok(Self { file, path })
    }

    /// Remove the lock file and release the lock.
    pub fn release(self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(error = %e, "failed to remove lock file");
        }
        // The advisory lock drops with `self.file`.
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read the decimal pid recorded in a lock file.
pub fn read_pid(path: &Path) -> Option<u32> {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Probe whether a process exists (`kill -0` semantics).
pub fn process_exists(pid: u32) -> bool {
    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
