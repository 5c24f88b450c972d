// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crash-safe snapshot persistence.
//!
//! Saves write to a sibling temp path, fsync, then rename over the
//! target, so a concurrent reader sees either the prior snapshot or
//! the new one, never a partial write. Unreadable or unknown-version
//! files are quarantined to a rotated `.bak` path and replaced with
//! fresh state.

use crate::snapshot::{StateSnapshot, SCHEMA_VERSION};
use crate::state::{RepairReport, WorkstreamTable};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// File name of the state document inside the state directory.
pub const STATE_FILE: &str = "state.json";

/// Errors that can occur in store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Handle to one repository's state directory.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Store rooted at `dir`; the document lives at `dir/state.json`.
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(STATE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a state document exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the snapshot, returning fresh state when the file is
    /// missing. Corrupt or unknown-version files are quarantined to a
    /// `.bak` path first so nothing is silently destroyed.
    pub fn load(&self) -> Result<StateSnapshot, StoreError> {
        if !self.path.exists() {
            return Ok(StateSnapshot::fresh());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        match serde_json::from_reader::<_, StateSnapshot>(reader) {
            Ok(snapshot) if snapshot.version == SCHEMA_VERSION => Ok(snapshot),
            Ok(snapshot) => {
                self.quarantine(&format!("unknown schema version {}", snapshot.version))?;
                Ok(StateSnapshot::fresh())
            }
            Err(e) => {
                self.quarantine(&e.to_string())?;
                Ok(StateSnapshot::fresh())
            }
        }
    }

    /// Save the snapshot atomically. A failed write is retried once
    /// with a fresh temp name before the error is surfaced.
    pub fn save(&self, snapshot: &StateSnapshot) -> Result<(), StoreError> {
        match self.save_via(snapshot, self.path.with_extension("json.tmp")) {
            Ok(()) => Ok(()),
            Err(first) => {
                warn!(error = %first, "state save failed, retrying with fresh temp file");
                self.save_via(snapshot, self.path.with_extension("json.tmp2"))
            }
        }
    }

    fn save_via(&self, snapshot: &StateSnapshot, tmp_path: PathBuf) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
            set_mode(parent, 0o755);
        }

        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, snapshot)?;
            writer.flush()?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }
        set_mode(&tmp_path, 0o644);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Reconcile the stored snapshot against observed reality and
    /// persist the result when anything changed.
    pub fn repair(
        &self,
        observed_panes: &[String],
        observed_containers: &[String],
    ) -> Result<RepairReport, StoreError> {
        let mut table = WorkstreamTable::from_snapshot(self.load()?);
        let report = table.repair(observed_panes, observed_containers);
        if !report.is_clean() {
            warn!(
                dropped = report.dropped.len(),
                marked_exited = report.marked_exited.len(),
                "state repair changed snapshot"
            );
            self.save(&table.to_snapshot())?;
        }
        Ok(report)
    }

    fn quarantine(&self, reason: &str) -> Result<(), StoreError> {
        let bak_path = rotate_bak_path(&self.path);
        warn!(
            reason,
            path = %self.path.display(),
            bak = %bak_path.display(),
            "quarantining unreadable state file and starting fresh",
        );
        fs::rename(&self.path, &bak_path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    let _ = fs::set_permissions(path, fs::Permissions::from_mode(mode));
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) {}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `.bak`, `.bak.2`, `.bak.3`.
/// The oldest backup is removed when the limit is reached.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    // Remove the oldest if at capacity
    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }

    // Shift existing backups up by one
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
