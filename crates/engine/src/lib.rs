// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ccells-engine: the workstream orchestrator and reconciliation loop.
//!
//! The orchestrator composes adapter calls into transactional
//! create / destroy / pause / resume / rebuild operations with
//! compensation on failure; the reconciler is a pure diff over
//! observed panes and containers; the policy applies that diff on a
//! timer to detect and repair drift.

pub mod image;
pub mod locks;
pub mod orchestrator;
pub mod pairing;
pub mod policy;
pub mod reconciler;
pub mod untracked;

pub use image::{image_tag, DOCKERFILE};
pub use locks::BranchLocks;
pub use orchestrator::{
    CreateOptions, CreateOutcome, DestroyOptions, Orchestrator, OrchestratorConfig,
    OrchestratorDeps,
};
pub use pairing::{PairingProvider, PairingState, SyncPairingProvider};
pub use policy::ReconcilePolicy;
pub use reconciler::{reconcile, ObservedPane, ReconcileResult};
