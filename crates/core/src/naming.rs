// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Derived names: repository ids, container names, session and socket
//! names, and the container labels used for orphan detection.

use crate::branch::sanitize_worktree_dir;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Label key carrying the repository identifier on every container.
pub const LABEL_REPOSITORY_ID: &str = "dev.ccells.repository-id";

/// Label key carrying the owning workstream's branch name.
pub const LABEL_WORKSTREAM_ID: &str = "dev.ccells.workstream-id";

/// Product prefix used in session, socket, and container names.
pub const PRODUCT: &str = "ccells";

/// Stable repository identifier: first 12 hex chars of the SHA-256 of
/// the canonical repository root path.
pub fn repo_id(repo_root: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(repo_root.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    hex[..12].to_string()
}

/// Human-readable repository slug: the root directory's file name,
/// lowercased and filtered to `[a-z0-9-]`.
pub fn repo_slug(repo_root: &Path) -> String {
    let name = repo_root
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let slug: String = name
        .chars()
        .map(|c| if c == '_' || c == '.' { '-' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();
    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() {
        "repo".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Container name for a workstream: `ccells-<repo-slug>-<safe-branch>`.
pub fn container_name(repo_slug: &str, branch: &str) -> String {
    format!("{}-{}-{}", PRODUCT, repo_slug, sanitize_worktree_dir(branch))
}

/// Multiplexer session name for a repository: `ccells-<repoId>`.
pub fn session_name(repo_id: &str) -> String {
    format!("{}-{}", PRODUCT, repo_id)
}

/// Socket name for a repository. Same derivation as the session name;
/// kept separate so the two can diverge without touching callers.
pub fn socket_name(repo_id: &str) -> String {
    format!("{}-{}", PRODUCT, repo_id)
}

#[cfg(test)]
#[path = "naming_tests.rs"]
mod tests;
