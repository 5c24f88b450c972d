// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ccells-daemon: the coordinator daemon.
//!
//! Accepts newline-delimited JSON requests on a per-repository Unix
//! socket, dispatches them into the workstream orchestrator, and runs
//! the reconciliation and pairing-health tickers. One daemon per
//! repository, guarded by the lock file.

pub mod env;
pub mod lifecycle;
pub mod listener;
pub mod protocol;
pub mod protocol_wire;

pub use lifecycle::{Config, DaemonHandle, LifecycleError};
pub use protocol::{CreateParams, PairParams, Request, Response};
pub use protocol_wire::{
    read_request, read_response, write_request, write_response, ProtocolError, DEFAULT_TIMEOUT,
    MAX_LINE_BYTES,
};

/// Daemon version string: crate version plus build hash.
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH"));
