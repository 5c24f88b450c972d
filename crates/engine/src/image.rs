// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The embedded base image definition and its content-addressed tag.

use sha2::{Digest, Sha256};

/// The Dockerfile compiled into the binary. Changing it changes the
/// image tag, which invalidates the cached image on next create.
pub const DOCKERFILE: &str = include_str!("Dockerfile");

/// Content-addressed image tag: `ccells:<first 12 hex of sha256>`.
pub fn image_tag(dockerfile: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(dockerfile);
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    format!("ccells:{}", &hex[..12])
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
