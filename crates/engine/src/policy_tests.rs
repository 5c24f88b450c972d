// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ccells_adapters::mux as mux_opts;
use ccells_adapters::mux::OPT_BORDER_TEXT;
use ccells_adapters::{FakeEngine, FakeMux, FakeNotifyAdapter};
use ccells_core::{Workstream, WorkstreamStatus};
use ccells_storage::StateStore;
use tempfile::TempDir;

const SESSION: &str = "ccells-test";
const REPO_ID: &str = "deadbeef0123";

struct PolicyBed {
    policy: ReconcilePolicy<FakeMux, FakeEngine, FakeNotifyAdapter>,
    mux: FakeMux,
    engine: FakeEngine,
    notify: FakeNotifyAdapter,
    store: StateStore,
    table: Arc<Mutex<WorkstreamTable>>,
    locks: BranchLocks,
    _dir: TempDir,
}

fn bed() -> PolicyBed {
    let dir = TempDir::new().unwrap();
    let mux = FakeMux::new();
    let engine = FakeEngine::new();
    let notify = FakeNotifyAdapter::new();
    let store = StateStore::new(dir.path());
    let table = Arc::new(Mutex::new(WorkstreamTable::new()));
    let locks = BranchLocks::new();
    let policy = ReconcilePolicy::new(
        mux.clone(),
        engine.clone(),
        notify.clone(),
        store.clone(),
        Arc::clone(&table),
        locks.clone(),
        SESSION.to_string(),
        REPO_ID.to_string(),
    );
    PolicyBed {
        policy,
        mux,
        engine,
        notify,
        store,
        table,
        locks,
        _dir: dir,
    }
}

fn seed_entry(bed: &PolicyBed, branch: &str, container: &str, status: WorkstreamStatus) {
    let mut ws = Workstream::reserve(branch, branch, "p", "claude");
    ws.container_id = container.to_string();
    ws.status = status;
    bed.table.lock().upsert(ws);
}

#[tokio::test]
async fn removes_orphan_containers() {
    let bed = bed();
    bed.engine.seed_container(
        "ccells-demo-ghost",
        true,
        &[
            (ccells_core::naming::LABEL_REPOSITORY_ID, REPO_ID),
            (ccells_core::naming::LABEL_WORKSTREAM_ID, "ghost"),
        ],
    );

    let report = bed.policy.run_once().await;
    assert_eq!(report.orphan_containers_removed, 1);
    assert!(bed.engine.container_names().is_empty());
}

#[tokio::test]
async fn skips_orphan_container_when_branch_is_locked() {
    let bed = bed();
    bed.engine.seed_container(
        "ccells-demo-busy",
        true,
        &[
            (ccells_core::naming::LABEL_REPOSITORY_ID, REPO_ID),
            (ccells_core::naming::LABEL_WORKSTREAM_ID, "busy"),
        ],
    );

    let _guard = bed.locks.lock("busy").await;
    let report = bed.policy.run_once().await;
    assert_eq!(report.orphan_containers_removed, 0);
    assert_eq!(bed.engine.container_names(), vec!["ccells-demo-busy"]);
}

#[tokio::test]
async fn marks_orphan_panes_exited_without_killing() {
    let bed = bed();
    let pane = bed.mux.seed_pane(
        SESSION,
        &[
            (mux_opts::OPT_WORKSTREAM, "gone"),
            (mux_opts::OPT_CONTAINER, "ccells-demo-gone"),
        ],
    );

    let report = bed.policy.run_once().await;
    assert_eq!(report.orphan_panes_marked, 1);
    assert!(bed.mux.pane_exists(&pane));
    assert_eq!(
        bed.mux.pane_options(&pane).get(mux_opts::OPT_STATUS).map(String::as_str),
        Some("exited")
    );
}

#[tokio::test]
async fn refreshes_borders_of_healthy_pairs() {
    let bed = bed();
    bed.engine.seed_container(
        "ccells-demo-ok",
        true,
        &[
            (ccells_core::naming::LABEL_REPOSITORY_ID, REPO_ID),
            (ccells_core::naming::LABEL_WORKSTREAM_ID, "ok"),
        ],
    );
    let pane = bed.mux.seed_pane(
        SESSION,
        &[
            (mux_opts::OPT_WORKSTREAM, "ok"),
            (mux_opts::OPT_CONTAINER, "ccells-demo-ok"),
        ],
    );

    let report = bed.policy.run_once().await;
    assert_eq!(report.borders_refreshed, 1);
    let border = bed.mux.pane_options(&pane).get(OPT_BORDER_TEXT).cloned();
    assert!(border.unwrap_or_default().starts_with("ok · "));
}

#[tokio::test]
async fn running_entry_with_stopped_container_becomes_exited_and_notifies_once() {
    let bed = bed();
    seed_entry(&bed, "feat", "ccells-demo-feat", WorkstreamStatus::Running);
    bed.engine.seed_container(
        "ccells-demo-feat",
        false,
        &[
            (ccells_core::naming::LABEL_REPOSITORY_ID, REPO_ID),
            (ccells_core::naming::LABEL_WORKSTREAM_ID, "feat"),
        ],
    );
    // A pane still references the container, so nothing is dropped.
    bed.mux.seed_pane(
        SESSION,
        &[
            (mux_opts::OPT_WORKSTREAM, "feat"),
            (mux_opts::OPT_CONTAINER, "ccells-demo-feat"),
        ],
    );

    let report = bed.policy.run_once().await;
    assert_eq!(report.marked_exited, vec!["feat".to_string()]);
    assert_eq!(
        bed.table.lock().get("feat").unwrap().status,
        WorkstreamStatus::Exited
    );
    assert_eq!(bed.notify.calls().len(), 1);

    // A second tick does not notify again.
    bed.policy.run_once().await;
    assert_eq!(bed.notify.calls().len(), 1);

    // The change was persisted.
    let snap = bed.store.load().unwrap();
    assert_eq!(snap.workstreams[0].status, WorkstreamStatus::Exited);
}

#[tokio::test]
async fn fully_vanished_entry_is_dropped_and_persisted() {
    let bed = bed();
    seed_entry(&bed, "gone", "ccells-demo-gone", WorkstreamStatus::Running);

    let report = bed.policy.run_once().await;
    assert_eq!(report.dropped, vec!["gone".to_string()]);
    assert!(bed.table.lock().is_empty());
    assert!(bed.store.load().unwrap().is_empty());
}

#[tokio::test]
async fn tick_survives_adapter_failures() {
    let bed = bed();
    bed.engine.seed_container(
        "ccells-demo-ghost",
        true,
        &[
            (ccells_core::naming::LABEL_REPOSITORY_ID, REPO_ID),
            (ccells_core::naming::LABEL_WORKSTREAM_ID, "ghost"),
        ],
    );
    bed.engine.fail_on("remove");
    let pane = bed.mux.seed_pane(SESSION, &[(mux_opts::OPT_WORKSTREAM, "orphan")]);

    // Removal fails but pane marking still happens.
    let report = bed.policy.run_once().await;
    assert_eq!(report.orphan_containers_removed, 0);
    assert_eq!(report.orphan_panes_marked, 1);
    assert!(bed.mux.pane_exists(&pane));
}
