// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scriptable agent CLI fake for tests.

use super::{AgentCliAdapter, AgentCliError, QueryOptions};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct FakeAgentState {
    response: Option<String>,
    fail: bool,
    queries: Vec<String>,
}

/// Fake implementing [`AgentCliAdapter`] with a scripted response.
#[derive(Clone, Default)]
pub struct FakeAgentCli {
    inner: Arc<Mutex<FakeAgentState>>,
}

impl FakeAgentCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next responses (all queries return this).
    pub fn respond_with(&self, text: &str) {
        self.inner.lock().response = Some(text.to_string());
    }

    /// Make all queries fail.
    pub fn fail(&self) {
        self.inner.lock().fail = true;
    }

    /// Prompts received so far.
    pub fn queries(&self) -> Vec<String> {
        self.inner.lock().queries.clone()
    }
}

#[async_trait]
impl AgentCliAdapter for FakeAgentCli {
    async fn query(&self, prompt: &str, _opts: &QueryOptions) -> Result<String, AgentCliError> {
        let mut st = self.inner.lock();
        st.queries.push(prompt.to_string());
        if st.fail {
            return Err(AgentCliError::QueryFailed("fake: scripted failure".into()));
        }
        Ok(st
            .response
            .clone()
            .unwrap_or_else(|| "Untitled Work".to_string()))
    }
}
