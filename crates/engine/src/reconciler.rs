// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure reconciliation diff.
//!
//! Partitions observed panes and containers into healthy pairs and
//! orphans. No adapter calls happen here; the policy gathers the
//! observations and applies the repairs.

use ccells_adapters::{ContainerInfo, PaneInfo};

/// A pane together with its ccells metadata options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedPane {
    pub pane: PaneInfo,
    /// `@workstream` option: the owning branch, if any.
    pub workstream: Option<String>,
    /// `@container` option: the container name the pane's agent runs in.
    pub container: Option<String>,
}

/// Partition of the observed world.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileResult {
    /// Pane/container pairs matched by the pane's `@container` name.
    pub healthy: Vec<(ObservedPane, ContainerInfo)>,
    /// Panes with workstream metadata whose container is absent.
    pub orphan_panes: Vec<ObservedPane>,
    /// Running containers of ours not referenced by any pane.
    pub orphan_containers: Vec<ContainerInfo>,
}

/// Diff observed panes against observed containers.
///
/// Panes without `@workstream` metadata are user-opened shells and are
/// ignored. Every pane with metadata lands in exactly one of
/// {healthy, orphan_panes}; every running container lands in exactly
/// one of {healthy, orphan_containers}.
pub fn reconcile(panes: &[ObservedPane], containers: &[ContainerInfo]) -> ReconcileResult {
    let mut result = ReconcileResult::default();
    let mut claimed: Vec<bool> = vec![false; containers.len()];

    for pane in panes {
        if pane.workstream.is_none() {
            continue;
        }
        let matched = pane.container.as_deref().and_then(|name| {
            containers
                .iter()
                .position(|c| c.name == name || c.id == name)
        });
        match matched {
            Some(idx) => {
                claimed[idx] = true;
                result.healthy.push((pane.clone(), containers[idx].clone()));
            }
            None => result.orphan_panes.push(pane.clone()),
        }
    }

    for (idx, container) in containers.iter().enumerate() {
        if !claimed[idx] && container.running {
            result.orphan_containers.push(container.clone());
        }
    }

    result
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
