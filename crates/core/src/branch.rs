// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Branch name grammar: validation, derivation from prompts, and
//! worktree directory sanitization.

use thiserror::Error;

/// Maximum length accepted for a branch name.
pub const MAX_BRANCH_LEN: usize = 200;

/// Words dropped when deriving a branch name from a prompt.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "for", "from", "in", "of", "on", "the", "to", "with",
];

/// Fallback name when derivation produces nothing usable.
const FALLBACK_NAME: &str = "workstream";

/// Errors from branch name validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BranchNameError {
    #[error("branch name cannot be empty")]
    Empty,

    #[error("branch name too long ({0} characters, max {MAX_BRANCH_LEN})")]
    TooLong(usize),

    #[error("branch name contains invalid character '{0}'")]
    InvalidChar(char),

    #[error("branch name cannot contain '..'")]
    DoubleDot,

    #[error("branch name cannot contain '//'")]
    DoubleSlash,

    #[error("branch name cannot start with '/'")]
    LeadingSlash,

    #[error("branch name cannot end with '/'")]
    TrailingSlash,

    #[error("branch name cannot start with '-'")]
    LeadingDash,

    #[error("branch name cannot end with '.lock'")]
    LockSuffix,
}

/// Validate a branch name against the grammar accepted by ccells.
///
/// Allowed: non-empty, at most [`MAX_BRANCH_LEN`] characters from
/// `[A-Za-z0-9._/-]`, no `..` or `//`, no leading/trailing `/`, no
/// leading `-`, no `.lock` suffix. This is deliberately stricter than
/// git's own ref grammar so every accepted name is also safe as a
/// label value and (after sanitization) a directory name.
pub fn validate_branch_name(name: &str) -> Result<(), BranchNameError> {
    if name.is_empty() {
        return Err(BranchNameError::Empty);
    }
    if name.len() > MAX_BRANCH_LEN {
        return Err(BranchNameError::TooLong(name.len()));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '.' | '_' | '/' | '-'))
    {
        return Err(BranchNameError::InvalidChar(c));
    }
    if name.contains("..") {
        return Err(BranchNameError::DoubleDot);
    }
    if name.contains("//") {
        return Err(BranchNameError::DoubleSlash);
    }
    if name.starts_with('/') {
        return Err(BranchNameError::LeadingSlash);
    }
    if name.ends_with('/') {
        return Err(BranchNameError::TrailingSlash);
    }
    if name.starts_with('-') {
        return Err(BranchNameError::LeadingDash);
    }
    if name.ends_with(".lock") {
        return Err(BranchNameError::LockSuffix);
    }
    Ok(())
}

/// Derive a branch name from free-form text (a prompt or an AI title).
///
/// Lowercases, splits on whitespace, drops stop words, keeps the first
/// four tokens joined with `-`, filters to `[a-z0-9-]`, and trims
/// stray hyphens. Falls back to `"workstream"` when nothing survives.
/// The result always passes [`validate_branch_name`], and the function
/// is idempotent: feeding its output back in returns the same name.
pub fn generate_branch_name(text: &str) -> String {
    let joined = text
        .to_lowercase()
        .split_whitespace()
        .filter(|w| !STOP_WORDS.contains(w))
        .take(4)
        .collect::<Vec<_>>()
        .join("-");

    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();

    let trimmed = filtered.trim_matches('-');
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Sanitize a branch name into a worktree directory component.
///
/// Replaces `/` with `-` and strips any rune outside `[A-Za-z0-9._-]`
/// so `feat/auth` lands at `<worktrees-root>/feat-auth`.
pub fn sanitize_worktree_dir(branch: &str) -> String {
    branch
        .chars()
        .map(|c| if c == '/' { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}

#[cfg(test)]
#[path = "branch_tests.rs"]
mod tests;
