// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ccells-adapters: Thin contracts over the external systems ccells
//! coordinates — the terminal multiplexer, the container engine, git
//! and its forge, the agent CLI, and desktop notifications.
//!
//! Each adapter is a trait with a production implementation that shells
//! out through [`subprocess::run_with_timeout`], plus a recording fake
//! behind the `test-support` feature. Errors are returned in-band;
//! adapters never panic.

pub mod agent;
pub mod engine;
pub mod git;
pub mod mux;
pub mod notify;
pub mod subprocess;

pub use agent::{AgentCliAdapter, AgentCliError, ClaudeCliAdapter, OutputFormat, QueryOptions};
pub use engine::{
    ContainerEngine, ContainerInfo, ContainerSpec, ContainerState, DockerEngine, EngineError,
    ValidationResult,
};
pub use git::{ForgeAdapter, GhForgeAdapter, GitAdapter, GitCliAdapter, GitError};
pub use mux::{MuxAdapter, MuxError, PaneInfo, TmuxAdapter};
pub use notify::{DesktopNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter, NotifyError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use agent::FakeAgentCli;
#[cfg(any(test, feature = "test-support"))]
pub use engine::{EngineCall, FakeEngine};
#[cfg(any(test, feature = "test-support"))]
pub use git::{FakeForge, FakeGit, GitCall};
#[cfg(any(test, feature = "test-support"))]
pub use mux::{FakeMux, MuxCall};
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyAdapter, NotifyCall};
