// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ccells-storage: Durable state snapshot and per-repository lock file.
//!
//! The snapshot is a single JSON document rewritten atomically; there
//! is no log and no concurrent writer. The daemon holds the lock file
//! and is the sole mutator; a crashed daemon leaves either the old or
//! the new snapshot intact, and reconciliation heals any drift.

pub mod lock;
pub mod snapshot;
pub mod state;
pub mod store;

pub use lock::{LockError, LockFile};
pub use snapshot::{StateSnapshot, SCHEMA_VERSION};
pub use state::{RepairReport, WorkstreamTable};
pub use store::{StateStore, StoreError};
