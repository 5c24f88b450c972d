// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn ws(branch: &str, status: WorkstreamStatus) -> Workstream {
    let mut ws = Workstream::reserve(branch, branch, "prompt", "claude");
    ws.container_id = format!("ccells-demo-{}", branch.replace('/', "-"));
    ws.status = status;
    ws
}

#[test]
fn upsert_get_remove_preserve_order() {
    let mut table = WorkstreamTable::new();
    table.upsert(ws("b", WorkstreamStatus::Running));
    table.upsert(ws("a", WorkstreamStatus::Running));
    table.upsert(ws("c", WorkstreamStatus::Running));

    assert_eq!(table.branches(), vec!["b", "a", "c"]);
    assert!(table.get("a").is_some());

    table.remove("a");
    assert_eq!(table.branches(), vec!["b", "c"]);
}

#[test]
fn next_id_bumps_counter_a() {
    let mut table = WorkstreamTable::new();
    assert_eq!(table.next_id(), "ws-000001");
    assert_eq!(table.next_id(), "ws-000002");
    assert_eq!(table.counter_a, 2);
}

#[test]
fn dedup_branch_appends_counter_b_suffix() {
    let mut table = WorkstreamTable::new();
    assert_eq!(table.dedup_branch("fix-bug"), "fix-bug");

    table.upsert(ws("fix-bug", WorkstreamStatus::Running));
    assert_eq!(table.dedup_branch("fix-bug"), "fix-bug-1");
    assert_eq!(table.counter_b, 1);
}

#[yare::parameterized(
    creating = { WorkstreamStatus::Creating, true },
    running  = { WorkstreamStatus::Running, true },
    paused   = { WorkstreamStatus::Paused, true },
    exited   = { WorkstreamStatus::Exited, false },
    failed   = { WorkstreamStatus::Failed, false },
)]
fn branch_activity(status: WorkstreamStatus, active: bool) {
    let mut table = WorkstreamTable::new();
    table.upsert(ws("feat", status));
    assert_eq!(table.is_branch_active("feat"), active);
}

#[test]
fn snapshot_conversion_round_trips() {
    let mut table = WorkstreamTable::new();
    table.counter_a = 5;
    table.counter_b = 2;
    table.upsert(ws("feat/auth", WorkstreamStatus::Running));
    table.upsert(ws("fix-bug", WorkstreamStatus::Paused));

    let snap = table.to_snapshot();
    assert_eq!(snap.version, SCHEMA_VERSION);
    assert_eq!(snap.workstreams.len(), 2);

    let back = WorkstreamTable::from_snapshot(snap);
    assert_eq!(back.counter_a, 5);
    assert_eq!(back.counter_b, 2);
    assert_eq!(back.branches(), table.branches());
}

#[test]
fn repair_drops_fully_vanished_entries() {
    let mut table = WorkstreamTable::new();
    table.upsert(ws("gone", WorkstreamStatus::Running));

    let report = table.repair(&[], &[]);
    assert_eq!(report.dropped, vec!["gone".to_string()]);
    assert!(table.is_empty());
}

#[test]
fn repair_marks_exited_when_pane_survives() {
    let mut table = WorkstreamTable::new();
    table.upsert(ws("half", WorkstreamStatus::Running));

    let report = table.repair(&["half".to_string()], &[]);
    assert_eq!(report.marked_exited, vec!["half".to_string()]);
    assert_eq!(
        table.get("half").unwrap().status,
        WorkstreamStatus::Exited
    );
}

#[test]
fn repair_keeps_healthy_entries() {
    let mut table = WorkstreamTable::new();
    let healthy = ws("ok", WorkstreamStatus::Running);
    let container = healthy.container_id.clone();
    table.upsert(healthy);

    let report = table.repair(&["ok".to_string()], &[container]);
    assert!(report.is_clean());
    assert_eq!(table.get("ok").unwrap().status, WorkstreamStatus::Running);
}

#[test]
fn repair_skips_entries_mid_create() {
    let mut table = WorkstreamTable::new();
    let mut creating = ws("new", WorkstreamStatus::Creating);
    creating.container_id = String::new();
    table.upsert(creating);

    let report = table.repair(&[], &[]);
    assert!(report.is_clean());
    assert!(table.get("new").is_some());
}

#[test]
fn paused_entry_with_stopped_container_is_not_dropped_when_pane_alive() {
    let mut table = WorkstreamTable::new();
    table.upsert(ws("paused", WorkstreamStatus::Paused));

    // Pane present, container gone: paused entries keep their status
    // (only running entries are demoted to exited).
    let report = table.repair(&["paused".to_string()], &[]);
    assert!(report.marked_exited.is_empty());
    assert_eq!(
        table.get("paused").unwrap().status,
        WorkstreamStatus::Paused
    );
}
