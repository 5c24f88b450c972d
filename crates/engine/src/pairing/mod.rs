// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pairing: an optional live sync between the user's local working
//! copy and a chosen workstream's container.
//!
//! The daemon is complete without pairing; it accepts any provider
//! satisfying the small capability set below. State is held in memory
//! only and lost on daemon restart.

mod sync;

pub use sync::SyncPairingProvider;

use async_trait::async_trait;
use ccells_core::DomainError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The pairing state exposed over RPC.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingState {
    pub active: bool,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub previous_branch: Option<String>,
    #[serde(default)]
    pub container_id: Option<String>,
    #[serde(default)]
    pub sync_healthy: bool,
    #[serde(default)]
    pub conflicts: Vec<String>,
    #[serde(default)]
    pub status_text: String,
}

/// Capability set a pairing provider must satisfy.
#[async_trait]
pub trait PairingProvider: Send + Sync + 'static {
    fn is_active(&self) -> bool;

    /// Attach the local working copy at `local_path` to `container_id`.
    async fn enable(
        &self,
        branch: &str,
        container_id: &str,
        local_path: &Path,
        previous_branch: Option<String>,
    ) -> Result<PairingState, DomainError>;

    async fn disable(&self) -> Result<(), DomainError>;

    /// Run one sync/health pass; called by the pairing ticker while
    /// active.
    async fn check_health(&self) -> Result<PairingState, DomainError>;

    fn get_state(&self) -> PairingState;
}
