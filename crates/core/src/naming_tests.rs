// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::PathBuf;

#[test]
fn repo_id_is_stable_and_twelve_hex() {
    let root = PathBuf::from("/home/user/projects/demo");
    let a = repo_id(&root);
    let b = repo_id(&root);
    assert_eq!(a, b);
    assert_eq!(a.len(), 12);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn repo_id_differs_per_path() {
    let a = repo_id(&PathBuf::from("/home/user/a"));
    let b = repo_id(&PathBuf::from("/home/user/b"));
    assert_ne!(a, b);
}

#[yare::parameterized(
    plain       = { "/home/user/demo", "demo" },
    underscores = { "/srv/my_project", "my-project" },
    mixed_case  = { "/srv/MyApp", "myapp" },
    dotted      = { "/srv/app.web", "app-web" },
    root        = { "/", "repo" },
)]
fn repo_slugs(path: &str, expected: &str) {
    assert_eq!(repo_slug(&PathBuf::from(path)), expected);
}

#[test]
fn container_name_sanitizes_branch_slashes() {
    assert_eq!(container_name("demo", "feat/auth"), "ccells-demo-feat-auth");
}

#[test]
fn session_and_socket_names_share_the_repo_id() {
    assert_eq!(session_name("abc123def456"), "ccells-abc123def456");
    assert_eq!(socket_name("abc123def456"), "ccells-abc123def456");
}
