// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The persisted state document.
//!
//! A single JSON file (`state.json`) holding the ordered workstream
//! sequence and two monotonic counters used for de-duplication. The
//! schema version increments only with incompatible changes; readers
//! refuse unknown versions and fall back to fresh state.

use ccells_core::Workstream;
use serde::{Deserialize, Serialize};

/// Current snapshot schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// The on-disk state document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub version: u32,
    /// Monotonic counter for workstream id suffixes.
    #[serde(default)]
    pub counter_a: u64,
    /// Monotonic counter for de-duplicating derived branch names.
    #[serde(default)]
    pub counter_b: u64,
    #[serde(default)]
    pub workstreams: Vec<Workstream>,
}

impl StateSnapshot {
    /// An empty snapshot at the current schema version.
    pub fn fresh() -> Self {
        Self {
            version: SCHEMA_VERSION,
            counter_a: 0,
            counter_b: 0,
            workstreams: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.workstreams.is_empty()
    }
}

impl Default for StateSnapshot {
    fn default() -> Self {
        Self::fresh()
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
