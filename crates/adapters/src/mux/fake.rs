// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory multiplexer fake for tests.
//!
//! Models sessions and panes (with their metadata options) in memory,
//! records every call, and can be scripted to fail specific operations
//! for fault-injection tests.

use super::{MuxAdapter, MuxError, PaneInfo};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A recorded multiplexer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MuxCall {
    NewSession(String),
    SplitWindow { session: String, command: String },
    KillPane(String),
    RespawnPane { pane: String, command: String },
    SendKeys { pane: String, keys: Vec<String> },
    SetPaneOption { pane: String, key: String, value: String },
    SelectLayout { session: String, layout: String },
    SetSessionOption { session: String, key: String },
    SetHook { session: String, hook: String },
    DisplayPopup { session: String },
    KillServer,
}

#[derive(Debug, Clone, Default)]
struct FakePane {
    command: String,
    dead: bool,
    options: HashMap<String, String>,
    captured: String,
}

#[derive(Default)]
struct FakeMuxState {
    sessions: HashMap<String, Vec<String>>,
    panes: HashMap<String, FakePane>,
    calls: Vec<MuxCall>,
    fail_ops: HashSet<&'static str>,
    server_running: bool,
    next_pane: u32,
}

/// In-memory fake implementing [`MuxAdapter`].
#[derive(Clone, Default)]
pub struct FakeMux {
    inner: Arc<Mutex<FakeMuxState>>,
}

impl FakeMux {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.inner.lock().server_running = true;
        fake
    }

    /// Make the named operation fail until cleared.
    pub fn fail_on(&self, op: &'static str) {
        self.inner.lock().fail_ops.insert(op);
    }

    pub fn clear_failures(&self) {
        self.inner.lock().fail_ops.clear();
    }

    /// All calls recorded so far.
    pub fn calls(&self) -> Vec<MuxCall> {
        self.inner.lock().calls.clone()
    }

    /// Directly seed a pane into a session, optionally with metadata.
    /// Used to model panes left over from a previous daemon run.
    pub fn seed_pane(&self, session: &str, options: &[(&str, &str)]) -> String {
        let mut st = self.inner.lock();
        let id = format!("%{}", st.next_pane);
        st.next_pane += 1;
        let mut pane = FakePane {
            command: "zsh".to_string(),
            ..Default::default()
        };
        for (k, v) in options {
            pane.options.insert(k.to_string(), v.to_string());
        }
        st.panes.insert(id.clone(), pane);
        st.sessions.entry(session.to_string()).or_default().push(id.clone());
        id
    }

    /// Script the output returned by `capture_pane` for a pane.
    pub fn set_captured(&self, pane: &str, output: &str) {
        if let Some(p) = self.inner.lock().panes.get_mut(pane) {
            p.captured = output.to_string();
        }
    }

    /// Read a pane's metadata options (test assertion helper).
    pub fn pane_options(&self, pane: &str) -> HashMap<String, String> {
        self.inner
            .lock()
            .panes
            .get(pane)
            .map(|p| p.options.clone())
            .unwrap_or_default()
    }

    pub fn pane_exists(&self, pane: &str) -> bool {
        self.inner.lock().panes.contains_key(pane)
    }

    fn check(&self, op: &'static str) -> Result<(), MuxError> {
        if self.inner.lock().fail_ops.contains(op) {
            return Err(MuxError::CommandFailed(format!("fake: {} failed", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl MuxAdapter for FakeMux {
    async fn server_running(&self) -> bool {
        self.inner.lock().server_running
    }

    async fn version(&self) -> Result<String, MuxError> {
        Ok("tmux 3.4 (fake)".to_string())
    }

    async fn prefix(&self) -> Result<String, MuxError> {
        Ok("C-b".to_string())
    }

    async fn new_session(
        &self,
        name: &str,
        initial_command: Option<&str>,
    ) -> Result<(), MuxError> {
        self.check("new_session")?;
        let mut st = self.inner.lock();
        st.calls.push(MuxCall::NewSession(name.to_string()));
        let id = format!("%{}", st.next_pane);
        st.next_pane += 1;
        st.panes.insert(
            id.clone(),
            FakePane {
                command: initial_command.unwrap_or("zsh").to_string(),
                ..Default::default()
            },
        );
        st.sessions.insert(name.to_string(), vec![id]);
        Ok(())
    }

    async fn has_session(&self, name: &str) -> Result<bool, MuxError> {
        Ok(self.inner.lock().sessions.contains_key(name))
    }

    async fn list_panes(&self, session: &str) -> Result<Vec<PaneInfo>, MuxError> {
        let st = self.inner.lock();
        let ids = st
            .sessions
            .get(session)
            .ok_or_else(|| MuxError::SessionNotFound(session.to_string()))?;
        Ok(ids
            .iter()
            .enumerate()
            .filter_map(|(index, id)| {
                st.panes.get(id).map(|p| PaneInfo {
                    id: id.clone(),
                    index: index as u32,
                    active: index == 0,
                    dead: p.dead,
                    width: 80,
                    height: 24,
                    current_command: p.command.clone(),
                })
            })
            .collect())
    }

    async fn split_window(&self, session: &str, command: &str) -> Result<String, MuxError> {
        self.check("split_window")?;
        let mut st = self.inner.lock();
        st.calls.push(MuxCall::SplitWindow {
            session: session.to_string(),
            command: command.to_string(),
        });
        if !st.sessions.contains_key(session) {
            return Err(MuxError::SessionNotFound(session.to_string()));
        }
        let id = format!("%{}", st.next_pane);
        st.next_pane += 1;
        st.panes.insert(
            id.clone(),
            FakePane {
                command: command.to_string(),
                ..Default::default()
            },
        );
        if let Some(panes) = st.sessions.get_mut(session) {
            panes.push(id.clone());
        }
        Ok(id)
    }

    async fn kill_pane(&self, id: &str) -> Result<(), MuxError> {
        self.check("kill_pane")?;
        let mut st = self.inner.lock();
        st.calls.push(MuxCall::KillPane(id.to_string()));
        st.panes.remove(id);
        for panes in st.sessions.values_mut() {
            panes.retain(|p| p != id);
        }
        Ok(())
    }

    async fn respawn_pane(&self, id: &str, command: &str) -> Result<(), MuxError> {
        self.check("respawn_pane")?;
        let mut st = self.inner.lock();
        st.calls.push(MuxCall::RespawnPane {
            pane: id.to_string(),
            command: command.to_string(),
        });
        let pane = st
            .panes
            .get_mut(id)
            .ok_or_else(|| MuxError::PaneNotFound(id.to_string()))?;
        pane.command = command.to_string();
        pane.dead = false;
        Ok(())
    }

    async fn send_keys(&self, pane_id: &str, keys: &[&str]) -> Result<(), MuxError> {
        self.check("send_keys")?;
        let mut st = self.inner.lock();
        if !st.panes.contains_key(pane_id) {
            return Err(MuxError::PaneNotFound(pane_id.to_string()));
        }
        st.calls.push(MuxCall::SendKeys {
            pane: pane_id.to_string(),
            keys: keys.iter().map(|s| s.to_string()).collect(),
        });
        Ok(())
    }

    async fn set_pane_option(&self, id: &str, key: &str, value: &str) -> Result<(), MuxError> {
        self.check("set_pane_option")?;
        let mut st = self.inner.lock();
        st.calls.push(MuxCall::SetPaneOption {
            pane: id.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        });
        let pane = st
            .panes
            .get_mut(id)
            .ok_or_else(|| MuxError::PaneNotFound(id.to_string()))?;
        pane.options.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_pane_option(&self, id: &str, key: &str) -> Result<Option<String>, MuxError> {
        let st = self.inner.lock();
        let pane = st
            .panes
            .get(id)
            .ok_or_else(|| MuxError::PaneNotFound(id.to_string()))?;
        Ok(pane.options.get(key).cloned())
    }

    async fn select_layout(&self, session: &str, layout: &str) -> Result<(), MuxError> {
        self.check("select_layout")?;
        self.inner.lock().calls.push(MuxCall::SelectLayout {
            session: session.to_string(),
            layout: layout.to_string(),
        });
        Ok(())
    }

    async fn set_session_option(
        &self,
        session: &str,
        key: &str,
        _value: &str,
    ) -> Result<(), MuxError> {
        self.inner.lock().calls.push(MuxCall::SetSessionOption {
            session: session.to_string(),
            key: key.to_string(),
        });
        Ok(())
    }

    async fn set_hook(&self, session: &str, hook: &str, _command: &str) -> Result<(), MuxError> {
        self.inner.lock().calls.push(MuxCall::SetHook {
            session: session.to_string(),
            hook: hook.to_string(),
        });
        Ok(())
    }

    async fn display_popup(&self, session: &str, _command: &str) -> Result<(), MuxError> {
        self.inner.lock().calls.push(MuxCall::DisplayPopup {
            session: session.to_string(),
        });
        Ok(())
    }

    async fn kill_server(&self) -> Result<(), MuxError> {
        let mut st = self.inner.lock();
        st.calls.push(MuxCall::KillServer);
        st.sessions.clear();
        st.panes.clear();
        st.server_running = false;
        Ok(())
    }

    async fn capture_pane(&self, id: &str, _lines: u32) -> Result<String, MuxError> {
        let st = self.inner.lock();
        let pane = st
            .panes
            .get(id)
            .ok_or_else(|| MuxError::PaneNotFound(id.to_string()))?;
        Ok(pane.captured.clone())
    }

    fn attach_command(&self, session: &str) -> Vec<String> {
        vec!["true".to_string(), session.to_string()]
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
