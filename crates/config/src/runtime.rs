// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime kind and its resolution chain.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Project config file, looked up at the repository root.
pub const PROJECT_CONFIG_FILE: &str = ".ccells.toml";

/// Global config file, relative to the user's config directory.
pub const GLOBAL_CONFIG_PATH: &str = "ccells/config.toml";

/// Errors from config handling
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown runtime '{0}' (expected one of: claude, codex, opencode)")]
    UnknownRuntime(String),
}

/// The agent runtime launched inside a workstream's container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeKind {
    #[default]
    Claude,
    Codex,
    Opencode,
}

impl RuntimeKind {
    /// Binary name invoked inside the container.
    pub fn binary(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Codex => "codex",
            Self::Opencode => "opencode",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "claude" => Ok(Self::Claude),
            "codex" => Ok(Self::Codex),
            "opencode" => Ok(Self::Opencode),
            other => Err(ConfigError::UnknownRuntime(other.to_string())),
        }
    }
}

impl std::fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.binary())
    }
}

/// Parsed shape of a config file. Unknown keys are ignored so older
/// binaries keep working against newer files.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub runtime: Option<String>,
}

impl ConfigFile {
    /// Load a config file; a missing file is an empty config, an
    /// unparseable file is an empty config with a warning.
    pub fn load(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
                Self::default()
            }
        }
    }
}

/// Resolve the runtime kind with precedence flag > project > global >
/// default.
///
/// A flag value that does not parse is an error; a config value that
/// does not parse logs a warning and falls through.
pub fn resolve_runtime(
    flag: Option<&str>,
    project: &ConfigFile,
    global: &ConfigFile,
) -> Result<RuntimeKind, ConfigError> {
    if let Some(flag) = flag {
        return RuntimeKind::parse(flag);
    }

    for (source, value) in [("project", &project.runtime), ("global", &global.runtime)] {
        if let Some(value) = value {
            match RuntimeKind::parse(value) {
                Ok(kind) => return Ok(kind),
                Err(e) => {
                    warn!(source, error = %e, "ignoring invalid runtime in config");
                }
            }
        }
    }

    Ok(RuntimeKind::default())
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
