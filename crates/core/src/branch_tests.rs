// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    plain          = { "fix-login" },
    nested         = { "feat/auth" },
    deeply_nested  = { "user/feat/auth" },
    dotted         = { "release-1.2" },
    underscored    = { "wip_thing" },
    single_char    = { "x" },
    digits         = { "123" },
)]
fn accepts_valid_names(name: &str) {
    assert_eq!(validate_branch_name(name), Ok(()));
}

#[yare::parameterized(
    empty           = { "", BranchNameError::Empty },
    double_dot      = { "feat..auth", BranchNameError::DoubleDot },
    double_slash    = { "feat//auth", BranchNameError::DoubleSlash },
    leading_slash   = { "/feat", BranchNameError::LeadingSlash },
    trailing_slash  = { "feat/", BranchNameError::TrailingSlash },
    leading_dash    = { "-bad", BranchNameError::LeadingDash },
    lock_suffix     = { "feat.lock", BranchNameError::LockSuffix },
    space           = { "feat auth", BranchNameError::InvalidChar(' ') },
    tilde           = { "feat~1", BranchNameError::InvalidChar('~') },
    unicode         = { "fé", BranchNameError::InvalidChar('é') },
)]
fn rejects_invalid_names(name: &str, expected: BranchNameError) {
    assert_eq!(validate_branch_name(name), Err(expected));
}

#[test]
fn rejects_name_at_201_characters() {
    let name = "a".repeat(201);
    assert_eq!(validate_branch_name(&name), Err(BranchNameError::TooLong(201)));
}

#[test]
fn accepts_name_at_200_characters() {
    let name = "a".repeat(200);
    assert_eq!(validate_branch_name(&name), Ok(()));
}

#[test]
fn leading_dash_message_is_user_facing() {
    let err = validate_branch_name("-bad").unwrap_err();
    assert_eq!(err.to_string(), "branch name cannot start with '-'");
}

#[yare::parameterized(
    simple          = { "Add login page", "add-login-page" },
    stop_words      = { "Add a login page for the app", "add-login-page-app" },
    truncates       = { "one two three four five six", "one-two-three-four" },
    punctuation     = { "Fix: the (weird) bug!", "fix-weird-bug" },
    empty           = { "", "workstream" },
    only_stop_words = { "the of a an", "workstream" },
    only_symbols    = { "!!! ???", "workstream" },
    mixed_case      = { "REFACTOR Parser", "refactor-parser" },
)]
fn generates_branch_names(text: &str, expected: &str) {
    assert_eq!(generate_branch_name(text), expected);
}

#[yare::parameterized(
    slash        = { "feat/auth", "feat-auth" },
    nested       = { "a/b/c", "a-b-c" },
    plain        = { "fix-login", "fix-login" },
    dotted       = { "v1.2", "v1.2" },
)]
fn sanitizes_worktree_dirs(branch: &str, expected: &str) {
    assert_eq!(sanitize_worktree_dir(branch), expected);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Derivation is idempotent: a derived name re-derives to itself.
        #[test]
        fn generate_is_idempotent(text in ".{0,120}") {
            let once = generate_branch_name(&text);
            let twice = generate_branch_name(&once);
            prop_assert_eq!(once, twice);
        }

        /// Every derived name passes validation.
        #[test]
        fn generated_names_validate(text in ".{0,120}") {
            let name = generate_branch_name(&text);
            prop_assert_eq!(validate_branch_name(&name), Ok(()));
        }

        /// Validation agrees with a direct statement of the grammar.
        #[test]
        fn validation_matches_grammar(name in ".{0,64}") {
            let grammar_ok = !name.is_empty()
                && name.len() <= MAX_BRANCH_LEN
                && name.chars().all(|c| {
                    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '/' | '-')
                })
                && !name.contains("..")
                && !name.contains("//")
                && !name.starts_with('/')
                && !name.ends_with('/')
                && !name.starts_with('-')
                && !name.ends_with(".lock");
            prop_assert_eq!(validate_branch_name(&name).is_ok(), grammar_ok);
        }
    }
}
