// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Copying untracked files from the repository working copy into a
//! fresh worktree.
//!
//! Worktrees start from a clean checkout, so untracked files the user
//! relies on (`.env`, local notes, editor config) are copied over on
//! request, preserving relative paths and permission bits. Copies are
//! idempotent: re-running after a partial failure overwrites.

use std::io;
use std::path::Path;

/// Copy the listed repository-relative paths from `repo_root` into
/// `worktree`. Missing sources are skipped; directories are created as
/// needed. Returns the number of files copied.
pub fn copy_untracked(repo_root: &Path, worktree: &Path, files: &[String]) -> io::Result<usize> {
    let mut copied = 0;
    for rel in files {
        let rel_path = Path::new(rel);
        // Reject absolute or escaping paths; only repository-relative
        // files may be copied.
        if rel_path.is_absolute()
            || rel_path
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            tracing::warn!(path = %rel, "skipping non-relative untracked path");
            continue;
        }

        let src = repo_root.join(rel_path);
        if !src.is_file() {
            tracing::debug!(path = %rel, "untracked file vanished before copy");
            continue;
        }

        let dest = worktree.join(rel_path);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(&src, &dest)?;

        // std::fs::copy carries permissions on unix, but be explicit:
        // the mode bit (e.g. +x scripts) is part of the contract.
        #[cfg(unix)]
        {
            let perms = std::fs::metadata(&src)?.permissions();
            std::fs::set_permissions(&dest, perms)?;
        }

        copied += 1;
    }
    Ok(copied)
}

#[cfg(test)]
#[path = "untracked_tests.rs"]
mod tests;
