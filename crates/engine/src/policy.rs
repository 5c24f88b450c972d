// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciliation policy: one periodic tick of observe → diff → repair.
//!
//! The mechanical diff lives in [`crate::reconciler`]; this module
//! decides what to do about it. Every step is best-effort: failures
//! are logged and never abort the remaining steps. A workstream whose
//! per-branch lock is held (an orchestrator transaction in flight) is
//! skipped for this tick.

use crate::locks::BranchLocks;
use crate::reconciler::{reconcile, ObservedPane};
use ccells_adapters::mux::{OPT_BORDER_TEXT, OPT_CONTAINER, OPT_STATUS, OPT_WORKSTREAM};
use ccells_adapters::{ContainerEngine, MuxAdapter, NotifyAdapter};
use ccells_core::naming::{LABEL_REPOSITORY_ID, LABEL_WORKSTREAM_ID};
use ccells_core::WorkstreamStatus;
use ccells_storage::{StateStore, WorkstreamTable};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Summary of what one tick changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub orphan_containers_removed: usize,
    pub orphan_panes_marked: usize,
    pub borders_refreshed: usize,
    pub marked_exited: Vec<String>,
    pub dropped: Vec<String>,
}

/// The periodic reconciliation policy.
pub struct ReconcilePolicy<M, E, N> {
    mux: M,
    engine: E,
    notify: N,
    store: StateStore,
    table: Arc<Mutex<WorkstreamTable>>,
    locks: BranchLocks,
    session: String,
    repo_id: String,
    /// Branches already notified about an unexpected exit.
    notified_exits: Mutex<HashSet<String>>,
}

impl<M, E, N> ReconcilePolicy<M, E, N>
where
    M: MuxAdapter,
    E: ContainerEngine,
    N: NotifyAdapter,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mux: M,
        engine: E,
        notify: N,
        store: StateStore,
        table: Arc<Mutex<WorkstreamTable>>,
        locks: BranchLocks,
        session: String,
        repo_id: String,
    ) -> Self {
        Self {
            mux,
            engine,
            notify,
            store,
            table,
            locks,
            session,
            repo_id,
            notified_exits: Mutex::new(HashSet::new()),
        }
    }

    /// Run one reconciliation tick.
    pub async fn run_once(&self) -> TickReport {
        let mut report = TickReport::default();

        // 1. Observe.
        let panes = self.observe_panes().await;
        let containers = match self
            .engine
            .list_by_label(LABEL_REPOSITORY_ID, &self.repo_id)
            .await
        {
            Ok(containers) => containers,
            Err(e) => {
                tracing::warn!(error = %e, "reconcile: listing containers failed");
                return report;
            }
        };

        // 2. Diff.
        let result = reconcile(&panes, &containers);

        // 3. Orphan containers are removed, unless their branch is
        //    mid-transaction.
        for container in &result.orphan_containers {
            let branch = container.labels.get(LABEL_WORKSTREAM_ID);
            let _guard = match branch {
                Some(branch) => match self.locks.try_lock(branch) {
                    Some(guard) => Some(guard),
                    None => {
                        tracing::debug!(branch = %branch, "reconcile: branch busy, skipping orphan");
                        continue;
                    }
                },
                None => None,
            };
            match self.engine.remove(&container.id, true).await {
                Ok(()) => {
                    tracing::info!(container = %container.name, "reconcile: removed orphan container");
                    report.orphan_containers_removed += 1;
                }
                Err(e) => {
                    tracing::warn!(container = %container.name, error = %e, "reconcile: orphan removal failed");
                }
            }
        }

        // 4. Orphan panes are marked, never killed: the user may still
        //    want to read the output.
        for pane in &result.orphan_panes {
            match self
                .mux
                .set_pane_option(&pane.pane.id, OPT_STATUS, "exited")
                .await
            {
                Ok(()) => report.orphan_panes_marked += 1,
                Err(e) => {
                    tracing::warn!(pane = %pane.pane.id, error = %e, "reconcile: marking orphan pane failed");
                }
            }
        }

        // 5. Healthy panes get their border text refreshed from the
        //    container status.
        for (pane, container) in &result.healthy {
            let border = match pane.workstream.as_deref() {
                Some(branch) => format!("{} · {}", branch, container.status),
                None => container.status.clone(),
            };
            if let Err(e) = self
                .mux
                .set_pane_option(&pane.pane.id, OPT_BORDER_TEXT, &border)
                .await
            {
                tracing::warn!(pane = %pane.pane.id, error = %e, "reconcile: border refresh failed");
            } else {
                report.borders_refreshed += 1;
            }
        }

        // 6. Mark running entries whose container stopped, then repair
        //    entries whose container and pane both vanished.
        self.detect_exits(&containers, &mut report).await;
        self.repair_state(&panes, &containers, &mut report);

        report
    }

    /// List panes of our session with their ccells metadata.
    async fn observe_panes(&self) -> Vec<ObservedPane> {
        let panes = match self.mux.list_panes(&self.session).await {
            Ok(panes) => panes,
            Err(e) => {
                tracing::warn!(error = %e, "reconcile: listing panes failed");
                return Vec::new();
            }
        };
        let mut observed = Vec::with_capacity(panes.len());
        for pane in panes {
            let workstream = self
                .mux
                .get_pane_option(&pane.id, OPT_WORKSTREAM)
                .await
                .ok()
                .flatten();
            let container = self
                .mux
                .get_pane_option(&pane.id, OPT_CONTAINER)
                .await
                .ok()
                .flatten();
            observed.push(ObservedPane {
                pane,
                workstream,
                container,
            });
        }
        observed
    }

    /// A running entry whose container is observed stopped becomes
    /// exited; the first such transition notifies the user.
    async fn detect_exits(
        &self,
        containers: &[ccells_adapters::ContainerInfo],
        report: &mut TickReport,
    ) {
        let running: Vec<String> = {
            let table = self.table.lock();
            table
                .iter()
                .filter(|ws| ws.status == WorkstreamStatus::Running)
                .map(|ws| ws.branch_name.clone())
                .collect()
        };

        for branch in running {
            let _guard = match self.locks.try_lock(&branch) {
                Some(guard) => guard,
                None => continue,
            };
            let container_id = match self.table.lock().get(&branch) {
                Some(ws) => ws.container_id.clone(),
                None => continue,
            };
            let stopped = containers
                .iter()
                .find(|c| c.name == container_id || c.id == container_id)
                .map(|c| !c.running);
            if stopped != Some(true) {
                continue;
            }

            tracing::info!(branch = %branch, "reconcile: container exited without destroy");
            if let Some(ws) = self.table.lock().get_mut(&branch) {
                ws.status = WorkstreamStatus::Exited;
            }
            report.marked_exited.push(branch.clone());

            if self.notified_exits.lock().insert(branch.clone()) {
                let _ = self
                    .notify
                    .notify("ccells", &format!("workstream '{}' exited", branch))
                    .await;
            }
        }
    }

    /// Drop or demote entries against observed reality and persist any
    /// change.
    fn repair_state(
        &self,
        panes: &[ObservedPane],
        containers: &[ccells_adapters::ContainerInfo],
        report: &mut TickReport,
    ) {
        let observed_branches: Vec<String> = panes
            .iter()
            .filter_map(|p| p.workstream.clone())
            .collect();
        let mut observed_containers: Vec<String> = Vec::new();
        for c in containers {
            observed_containers.push(c.name.clone());
            observed_containers.push(c.id.clone());
        }

        let (repair, snapshot) = {
            let mut table = self.table.lock();
            let repair = table.repair(&observed_branches, &observed_containers);
            (repair.clone(), table.to_snapshot())
        };
        report.dropped.extend(repair.dropped);
        report.marked_exited.extend(repair.marked_exited);

        if !report.marked_exited.is_empty() || !report.dropped.is_empty() {
            if let Err(e) = self.store.save(&snapshot) {
                tracing::warn!(error = %e, "reconcile: failed to persist repaired state");
            }
        }
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
