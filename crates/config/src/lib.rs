// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ccells-config: runtime-kind resolution and config file loading.
//!
//! The agent runtime for a workstream resolves with precedence
//! flag > project config > global config > default. An invalid value
//! from a config file falls through to the next source with a warning
//! (files go stale); an invalid `--runtime` flag is rejected outright,
//! because the flag is explicit user input.

mod runtime;

pub use runtime::{
    resolve_runtime, ConfigError, ConfigFile, RuntimeKind, GLOBAL_CONFIG_PATH, PROJECT_CONFIG_FILE,
};
