// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container engine adapters

mod docker;

pub use docker::DockerEngine;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{EngineCall, FakeEngine};

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors from container engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("container not found: {0}")]
    NotFound(String),
    #[error("image build failed: {0}")]
    BuildFailed(String),
    #[error("engine command failed: {0}")]
    CommandFailed(String),
    #[error("engine unavailable: {0}")]
    Unavailable(String),
}

/// Specification for a new container.
#[derive(Debug, Clone, Default)]
pub struct ContainerSpec {
    pub image: String,
    pub name: String,
    /// `(key, value)` labels; ccells always sets the repository-id and
    /// workstream-id labels so orphans can be enumerated later.
    pub labels: Vec<(String, String)>,
    /// Bind mounts as `(host path, container path)`.
    pub binds: Vec<(PathBuf, String)>,
    pub env: Vec<(String, String)>,
    pub workdir: String,
}

/// One container as observed by `list_by_label`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    pub running: bool,
    pub status: String,
    pub labels: HashMap<String, String>,
}

/// Inspected runtime state of a single container.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContainerState {
    pub running: bool,
    pub paused: bool,
    pub exit_code: Option<i64>,
    pub status: String,
}

/// Result of checking engine prerequisites before a create.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub ok: bool,
    pub problems: Vec<String>,
}

/// Adapter over the container engine.
#[async_trait]
pub trait ContainerEngine: Clone + Send + Sync + 'static {
    /// Build `tag` from `dockerfile` bytes if the image is missing.
    /// Idempotent: the tag is content-addressed, so an existing image
    /// is always the right one.
    async fn ensure_image(
        &self,
        tag: &str,
        dockerfile: &[u8],
        deadline: Duration,
    ) -> Result<(), EngineError>;

    /// Create a container from `spec`; returns the engine's id.
    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, EngineError>;

    async fn start(&self, id: &str) -> Result<(), EngineError>;

    async fn stop(&self, id: &str, grace: Duration) -> Result<(), EngineError>;

    async fn pause(&self, id: &str) -> Result<(), EngineError>;

    async fn unpause(&self, id: &str) -> Result<(), EngineError>;

    async fn remove(&self, id: &str, force: bool) -> Result<(), EngineError>;

    /// Run `argv` inside the container without waiting for it.
    async fn exec_detached(&self, id: &str, argv: &[&str]) -> Result<(), EngineError>;

    async fn inspect(&self, id: &str) -> Result<ContainerState, EngineError>;

    async fn list_by_label(&self, key: &str, value: &str)
        -> Result<Vec<ContainerInfo>, EngineError>;

    /// Remove our labelled containers whose ids are not in `known_ids`;
    /// returns how many were removed.
    async fn cleanup_orphaned(
        &self,
        repo_label_value: &str,
        known_ids: &[String],
    ) -> Result<usize, EngineError>;

    /// Check that the engine binary exists and its daemon is reachable.
    async fn validate_prerequisites(&self) -> ValidationResult;

    /// Copy a host file or directory into the container (pairing sync).
    async fn copy_into(&self, id: &str, src: &Path, dest: &str) -> Result<(), EngineError>;

    /// Paths changed inside the container since it started (pairing
    /// conflict detection).
    async fn changed_paths(&self, id: &str) -> Result<Vec<String>, EngineError>;
}
