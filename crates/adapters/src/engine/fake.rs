// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory container engine fake for tests.
//!
//! Models images and containers (with labels and run state), records
//! calls, and supports scripted per-operation failures for the
//! orchestrator's compensation tests.

use super::{
    ContainerEngine, ContainerInfo, ContainerSpec, ContainerState, EngineError, ValidationResult,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// A recorded engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    EnsureImage(String),
    Create(String),
    Start(String),
    Stop(String),
    Pause(String),
    Unpause(String),
    Remove { id: String, force: bool },
    ExecDetached { id: String, argv: Vec<String> },
    CopyInto { id: String, dest: String },
}

#[derive(Debug, Clone)]
struct FakeContainer {
    id: String,
    name: String,
    running: bool,
    paused: bool,
    exit_code: Option<i64>,
    labels: HashMap<String, String>,
}

#[derive(Default)]
struct FakeEngineState {
    images: HashSet<String>,
    containers: Vec<FakeContainer>,
    calls: Vec<EngineCall>,
    fail_ops: HashSet<&'static str>,
    prerequisites_ok: bool,
    changed: HashMap<String, Vec<String>>,
    next_id: u32,
}

/// In-memory fake implementing [`ContainerEngine`].
#[derive(Clone, Default)]
pub struct FakeEngine {
    inner: Arc<Mutex<FakeEngineState>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.inner.lock().prerequisites_ok = true;
        fake
    }

    /// Make the named operation fail until cleared.
    pub fn fail_on(&self, op: &'static str) {
        self.inner.lock().fail_ops.insert(op);
    }

    pub fn clear_failures(&self) {
        self.inner.lock().fail_ops.clear();
    }

    pub fn set_prerequisites_ok(&self, ok: bool) {
        self.inner.lock().prerequisites_ok = ok;
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.inner.lock().calls.clone()
    }

    /// Names of containers currently present (any state).
    pub fn container_names(&self) -> Vec<String> {
        self.inner
            .lock()
            .containers
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    /// Seed a container directly, as if left over from a prior run.
    pub fn seed_container(
        &self,
        name: &str,
        running: bool,
        labels: &[(&str, &str)],
    ) -> String {
        let mut st = self.inner.lock();
        let id = format!("c{:06}", st.next_id);
        st.next_id += 1;
        st.containers.push(FakeContainer {
            id: id.clone(),
            name: name.to_string(),
            running,
            paused: false,
            exit_code: if running { None } else { Some(0) },
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        id
    }

    /// Mark a container as exited (the agent finished or crashed).
    pub fn mark_exited(&self, name_or_id: &str, code: i64) {
        let mut st = self.inner.lock();
        if let Some(c) = st
            .containers
            .iter_mut()
            .find(|c| c.name == name_or_id || c.id == name_or_id)
        {
            c.running = false;
            c.paused = false;
            c.exit_code = Some(code);
        }
    }

    /// Script the `changed_paths` response for a container.
    pub fn set_changed_paths(&self, id: &str, paths: &[&str]) {
        self.inner
            .lock()
            .changed
            .insert(id.to_string(), paths.iter().map(|s| s.to_string()).collect());
    }

    pub fn has_image(&self, tag: &str) -> bool {
        self.inner.lock().images.contains(tag)
    }

    fn check(&self, op: &'static str) -> Result<(), EngineError> {
        if self.inner.lock().fail_ops.contains(op) {
            return Err(EngineError::CommandFailed(format!("fake: {} failed", op)));
        }
        Ok(())
    }

    fn with_container<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut FakeContainer) -> T,
    ) -> Result<T, EngineError> {
        let mut st = self.inner.lock();
        let container = st
            .containers
            .iter_mut()
            .find(|c| c.id == id || c.name == id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        Ok(f(container))
    }
}

#[async_trait]
impl ContainerEngine for FakeEngine {
    async fn ensure_image(
        &self,
        tag: &str,
        _dockerfile: &[u8],
        _deadline: Duration,
    ) -> Result<(), EngineError> {
        self.check("ensure_image")?;
        let mut st = self.inner.lock();
        st.calls.push(EngineCall::EnsureImage(tag.to_string()));
        st.images.insert(tag.to_string());
        Ok(())
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, EngineError> {
        self.check("create_container")?;
        let mut st = self.inner.lock();
        st.calls.push(EngineCall::Create(spec.name.clone()));
        if st.containers.iter().any(|c| c.name == spec.name) {
            return Err(EngineError::CommandFailed(format!(
                "container name already in use: {}",
                spec.name
            )));
        }
        let id = format!("c{:06}", st.next_id);
        st.next_id += 1;
        st.containers.push(FakeContainer {
            id: id.clone(),
            name: spec.name.clone(),
            running: false,
            paused: false,
            exit_code: None,
            labels: spec.labels.iter().cloned().collect(),
        });
        Ok(id)
    }

    async fn start(&self, id: &str) -> Result<(), EngineError> {
        self.check("start")?;
        self.inner.lock().calls.push(EngineCall::Start(id.to_string()));
        self.with_container(id, |c| {
            c.running = true;
            c.exit_code = None;
        })
    }

    async fn stop(&self, id: &str, _grace: Duration) -> Result<(), EngineError> {
        self.check("stop")?;
        self.inner.lock().calls.push(EngineCall::Stop(id.to_string()));
        self.with_container(id, |c| {
            c.running = false;
            c.paused = false;
            c.exit_code = Some(0);
        })
    }

    async fn pause(&self, id: &str) -> Result<(), EngineError> {
        self.check("pause")?;
        self.inner.lock().calls.push(EngineCall::Pause(id.to_string()));
        self.with_container(id, |c| c.paused = true)
    }

    async fn unpause(&self, id: &str) -> Result<(), EngineError> {
        self.check("unpause")?;
        self.inner
            .lock()
            .calls
            .push(EngineCall::Unpause(id.to_string()));
        self.with_container(id, |c| c.paused = false)
    }

    async fn remove(&self, id: &str, force: bool) -> Result<(), EngineError> {
        self.check("remove")?;
        let mut st = self.inner.lock();
        st.calls.push(EngineCall::Remove {
            id: id.to_string(),
            force,
        });
        let before = st.containers.len();
        st.containers.retain(|c| {
            let matches = c.id == id || c.name == id;
            if matches && c.running && !force {
                return true;
            }
            !matches
        });
        if st.containers.len() == before {
            return Err(EngineError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn exec_detached(&self, id: &str, argv: &[&str]) -> Result<(), EngineError> {
        self.check("exec_detached")?;
        let mut st = self.inner.lock();
        st.calls.push(EngineCall::ExecDetached {
            id: id.to_string(),
            argv: argv.iter().map(|s| s.to_string()).collect(),
        });
        if !st.containers.iter().any(|c| c.id == id || c.name == id) {
            return Err(EngineError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn inspect(&self, id: &str) -> Result<ContainerState, EngineError> {
        self.with_container(id, |c| ContainerState {
            running: c.running,
            paused: c.paused,
            exit_code: c.exit_code,
            status: if c.paused {
                "paused".to_string()
            } else if c.running {
                "running".to_string()
            } else {
                "exited".to_string()
            },
        })
    }

    async fn list_by_label(
        &self,
        key: &str,
        value: &str,
    ) -> Result<Vec<ContainerInfo>, EngineError> {
        self.check("list_by_label")?;
        Ok(self
            .inner
            .lock()
            .containers
            .iter()
            .filter(|c| c.labels.get(key).map(String::as_str) == Some(value))
            .map(|c| ContainerInfo {
                id: c.id.clone(),
                name: c.name.clone(),
                running: c.running,
                status: if c.running { "running" } else { "exited" }.to_string(),
                labels: c.labels.clone(),
            })
            .collect())
    }

    async fn cleanup_orphaned(
        &self,
        repo_label_value: &str,
        known_ids: &[String],
    ) -> Result<usize, EngineError> {
        let ours = self
            .list_by_label(ccells_core::naming::LABEL_REPOSITORY_ID, repo_label_value)
            .await?;
        let mut removed = 0;
        for info in ours {
            let known = known_ids
                .iter()
                .any(|id| *id == info.id || *id == info.name);
            if !known {
                self.remove(&info.id, true).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn validate_prerequisites(&self) -> ValidationResult {
        let ok = self.inner.lock().prerequisites_ok;
        ValidationResult {
            ok,
            problems: if ok {
                vec![]
            } else {
                vec!["engine unavailable (fake)".to_string()]
            },
        }
    }

    async fn copy_into(&self, id: &str, _src: &Path, dest: &str) -> Result<(), EngineError> {
        self.check("copy_into")?;
        let mut st = self.inner.lock();
        st.calls.push(EngineCall::CopyInto {
            id: id.to_string(),
            dest: dest.to_string(),
        });
        if !st.containers.iter().any(|c| c.id == id || c.name == id) {
            return Err(EngineError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn changed_paths(&self, id: &str) -> Result<Vec<String>, EngineError> {
        self.check("changed_paths")?;
        Ok(self
            .inner
            .lock()
            .changed
            .get(id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
