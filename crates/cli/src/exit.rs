// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI exit codes.
//!
//! 0 ok; 1 usage error; 2 prerequisite failed; 3 daemon unreachable;
//! 4 operation failed.

use crate::client::ClientError;
use thiserror::Error;

/// A CLI failure with a fixed process exit code.
#[derive(Debug, Error)]
pub enum ExitError {
    #[error("{0}")]
    Usage(String),

    #[error("{0}")]
    Prerequisite(String),

    #[error("{0}")]
    Unreachable(String),

    #[error("{0}")]
    Operation(String),
}

impl ExitError {
    pub fn code(&self) -> i32 {
        match self {
            Self::Usage(_) => 1,
            Self::Prerequisite(_) => 2,
            Self::Unreachable(_) => 3,
            Self::Operation(_) => 4,
        }
    }
}

impl From<ClientError> for ExitError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::DaemonNotRunning | ClientError::ConnectFailed(_) => Self::Unreachable(
                "daemon not reachable — is the session running? (try `ccells up`)".to_string(),
            ),
            ClientError::Rejected(message) => Self::Operation(message),
            other => Self::Operation(other.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "exit_tests.rs"]
mod tests;
