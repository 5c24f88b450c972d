// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain error classification shared across the daemon boundary.
//!
//! Adapter and storage failures are converted into a [`DomainError`]
//! before they cross a handler boundary; the socket layer renders the
//! message, never the internal error chain.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a failure, carried as data across the daemon
/// boundary rather than as a panic or a bare string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Malformed request, unknown action, missing required field.
    Usage,
    /// Branch invalid, branch already active, prerequisite missing.
    Precondition,
    /// A subprocess or external API returned non-zero.
    Adapter,
    /// Snapshot read/write failure.
    State,
    /// Parent context cancelled; work stopped at a suspension point.
    Cancelled,
    /// Per-operation deadline elapsed.
    Timeout,
}

/// A classified failure with a user-facing message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct DomainError {
    pub kind: ErrorKind,
    pub message: String,
    /// Whether retrying the same operation could succeed.
    pub recoverable: bool,
}

impl DomainError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let recoverable = matches!(kind, ErrorKind::Adapter | ErrorKind::Timeout);
        Self {
            kind,
            message: message.into(),
            recoverable,
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Usage, message)
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Precondition, message)
    }

    pub fn adapter(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Adapter, message)
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::State, message)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "operation cancelled")
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
