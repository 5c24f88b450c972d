// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory workstream table.
//!
//! The daemon's working copy of the snapshot: an insertion-ordered map
//! keyed by branch name, plus the two de-duplication counters. The
//! table converts to and from [`StateSnapshot`] for persistence.

use crate::snapshot::{StateSnapshot, SCHEMA_VERSION};
use ccells_core::{Workstream, WorkstreamStatus};
use indexmap::IndexMap;

/// Insertion-ordered table of workstreams keyed by branch name.
#[derive(Debug, Clone, Default)]
pub struct WorkstreamTable {
    entries: IndexMap<String, Workstream>,
    pub counter_a: u64,
    pub counter_b: u64,
}

/// Outcome of reconciling the table against observed reality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Branches whose entries were dropped (container and pane both gone).
    pub dropped: Vec<String>,
    /// Branches marked exited (container gone, pane still present).
    pub marked_exited: Vec<String>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty() && self.marked_exited.is_empty()
    }
}

impl WorkstreamTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next workstream id, bumping `counter_a`.
    pub fn next_id(&mut self) -> String {
        self.counter_a += 1;
        format!("ws-{:06}", self.counter_a)
    }

    /// De-duplicate a derived branch name against existing entries by
    /// appending a `-N` suffix, bumping `counter_b` when needed.
    pub fn dedup_branch(&mut self, branch: &str) -> String {
        if !self.entries.contains_key(branch) {
            return branch.to_string();
        }
        self.counter_b += 1;
        format!("{}-{}", branch, self.counter_b)
    }

    pub fn get(&self, branch: &str) -> Option<&Workstream> {
        self.entries.get(branch)
    }

    pub fn get_mut(&mut self, branch: &str) -> Option<&mut Workstream> {
        self.entries.get_mut(branch)
    }

    /// Insert or replace the entry for `ws.branch_name`.
    pub fn upsert(&mut self, ws: Workstream) {
        self.entries.insert(ws.branch_name.clone(), ws);
    }

    pub fn remove(&mut self, branch: &str) -> Option<Workstream> {
        self.entries.shift_remove(branch)
    }

    /// Whether an entry currently occupies the branch's active slot
    /// (status creating, running, or paused).
    pub fn is_branch_active(&self, branch: &str) -> bool {
        self.entries
            .get(branch)
            .map(|ws| ws.status.is_active())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Workstream> {
        self.entries.values()
    }

    pub fn branches(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Container ids/names of all entries, for orphan cleanup.
    pub fn known_container_ids(&self) -> Vec<String> {
        self.entries
            .values()
            .filter(|ws| !ws.container_id.is_empty())
            .map(|ws| ws.container_id.clone())
            .collect()
    }

    /// Reconcile against observed panes (by `@workstream` branch) and
    /// containers (by container name/id).
    ///
    /// An entry whose container AND pane have both vanished is dropped;
    /// a running entry whose container vanished but whose pane survives
    /// is marked exited so the user can still read the pane output.
    pub fn repair(&mut self, observed_panes: &[String], observed_containers: &[String]) -> RepairReport {
        let mut report = RepairReport::default();

        let branches: Vec<String> = self.entries.keys().cloned().collect();
        for branch in branches {
            let Some(ws) = self.entries.get(&branch) else {
                continue;
            };
            // Entries mid-create have no resources recorded yet; the
            // per-branch lock keeps repair away from them, and a crash
            // mid-create is handled by the vanished check below only
            // once both ids are known.
            if ws.status == WorkstreamStatus::Creating {
                continue;
            }

            let container_present = !ws.container_id.is_empty()
                && observed_containers
                    .iter()
                    .any(|c| *c == ws.container_id);
            let pane_present = observed_panes.iter().any(|p| *p == branch);

            if container_present {
                continue;
            }
            if pane_present {
                if ws.status == WorkstreamStatus::Running {
                    if let Some(ws) = self.entries.get_mut(&branch) {
                        ws.status = WorkstreamStatus::Exited;
                    }
                    report.marked_exited.push(branch);
                }
            } else {
                self.entries.shift_remove(&branch);
                report.dropped.push(branch);
            }
        }

        report
    }

    /// Convert to the on-disk document.
    pub fn to_snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            version: SCHEMA_VERSION,
            counter_a: self.counter_a,
            counter_b: self.counter_b,
            workstreams: self.entries.values().cloned().collect(),
        }
    }

    /// Build from a loaded document, keyed by branch name. Later
    /// duplicates of a branch replace earlier ones.
    pub fn from_snapshot(snapshot: StateSnapshot) -> Self {
        let mut entries = IndexMap::new();
        for ws in snapshot.workstreams {
            entries.insert(ws.branch_name.clone(), ws);
        }
        Self {
            entries,
            counter_a: snapshot.counter_a,
            counter_b: snapshot.counter_b,
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
