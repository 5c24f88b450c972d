// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker CLI container engine adapter.
//!
//! All operations shell out to the `docker` binary; the build step
//! pipes the embedded Dockerfile over stdin so no build context files
//! ever touch the repository.

use super::{
    ContainerEngine, ContainerInfo, ContainerSpec, ContainerState, EngineError, ValidationResult,
};
use crate::subprocess::{run_with_timeout, stderr_snippet, ENGINE_TIMEOUT};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Docker-based container engine adapter
#[derive(Clone, Default)]
pub struct DockerEngine;

impl DockerEngine {
    pub fn new() -> Self {
        Self
    }

    async fn run(
        &self,
        args: &[&str],
        timeout: Duration,
        description: &str,
    ) -> Result<std::process::Output, EngineError> {
        let mut cmd = Command::new("docker");
        cmd.args(args);
        run_with_timeout(cmd, timeout, description)
            .await
            .map_err(EngineError::CommandFailed)
    }

    async fn run_ok(&self, args: &[&str], description: &str) -> Result<(), EngineError> {
        let output = self.run(args, ENGINE_TIMEOUT, description).await?;
        if !output.status.success() {
            let stderr = stderr_snippet(&output.stderr);
            if stderr.contains("No such container") {
                return Err(EngineError::NotFound(stderr));
            }
            return Err(EngineError::CommandFailed(format!(
                "{}: {}",
                description, stderr
            )));
        }
        Ok(())
    }

    async fn image_exists(&self, tag: &str) -> Result<bool, EngineError> {
        let output = self
            .run(&["image", "inspect", tag], ENGINE_TIMEOUT, "docker image inspect")
            .await?;
        Ok(output.status.success())
    }
}

/// Parse one line of `docker ps --format '{{json .}}'` output.
fn parse_container_line(line: &str) -> Option<ContainerInfo> {
    let value: serde_json::Value = serde_json::from_str(line).ok()?;
    let labels = value
        .get("Labels")
        .and_then(|l| l.as_str())
        .map(parse_label_csv)
        .unwrap_or_default();
    let state = value.get("State").and_then(|s| s.as_str()).unwrap_or("");
    Some(ContainerInfo {
        id: value.get("ID")?.as_str()?.to_string(),
        name: value.get("Names")?.as_str()?.to_string(),
        running: state == "running" || state == "paused",
        status: value
            .get("Status")
            .and_then(|s| s.as_str())
            .unwrap_or(state)
            .to_string(),
        labels,
    })
}

/// `docker ps` renders labels as `k1=v1,k2=v2`.
fn parse_label_csv(csv: &str) -> HashMap<String, String> {
    csv.split(',')
        .filter_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            Some((k.to_string(), v.to_string()))
        })
        .collect()
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn ensure_image(
        &self,
        tag: &str,
        dockerfile: &[u8],
        deadline: Duration,
    ) -> Result<(), EngineError> {
        if self.image_exists(tag).await? {
            return Ok(());
        }

        tracing::info!(tag, "building base image");

        // Dockerfile over stdin; context is an empty temp dir so stray
        // repository files can never leak into the build.
        let ctx = std::env::temp_dir().join(format!(
            "ccells-build-{:08x}",
            rand::random::<u32>()
        ));
        std::fs::create_dir_all(&ctx)
            .map_err(|e| EngineError::BuildFailed(format!("build context: {}", e)))?;

        let mut cmd = Command::new("docker");
        cmd.args(["build", "-t", tag, "-f", "-"])
            .arg(&ctx)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let result = async {
            let mut child = cmd
                .spawn()
                .map_err(|e| EngineError::BuildFailed(e.to_string()))?;
            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(dockerfile)
                    .await
                    .map_err(|e| EngineError::BuildFailed(e.to_string()))?;
                drop(stdin);
            }
            let output = tokio::time::timeout(deadline, child.wait_with_output())
                .await
                .map_err(|_| {
                    EngineError::BuildFailed(format!(
                        "docker build timed out after {}s",
                        deadline.as_secs()
                    ))
                })?
                .map_err(|e| EngineError::BuildFailed(e.to_string()))?;
            if !output.status.success() {
                return Err(EngineError::BuildFailed(stderr_snippet(&output.stderr)));
            }
            Ok(())
        }
        .await;

        let _ = std::fs::remove_dir_all(&ctx);
        result
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, EngineError> {
        let mut args: Vec<String> = vec![
            "create".into(),
            "--name".into(),
            spec.name.clone(),
            "-t".into(),
        ];
        for (k, v) in &spec.labels {
            args.push("--label".into());
            args.push(format!("{}={}", k, v));
        }
        for (host, container) in &spec.binds {
            args.push("-v".into());
            args.push(format!("{}:{}", host.display(), container));
        }
        for (k, v) in &spec.env {
            args.push("-e".into());
            args.push(format!("{}={}", k, v));
        }
        if !spec.workdir.is_empty() {
            args.push("-w".into());
            args.push(spec.workdir.clone());
        }
        args.push(spec.image.clone());
        // Keep the container alive; the agent runs via exec.
        args.push("sleep".into());
        args.push("infinity".into());

        let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
        let output = self
            .run(&arg_refs, ENGINE_TIMEOUT, "docker create")
            .await?;
        if !output.status.success() {
            return Err(EngineError::CommandFailed(format!(
                "docker create: {}",
                stderr_snippet(&output.stderr)
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn start(&self, id: &str) -> Result<(), EngineError> {
        self.run_ok(&["start", id], "docker start").await
    }

    async fn stop(&self, id: &str, grace: Duration) -> Result<(), EngineError> {
        let grace_secs = grace.as_secs().to_string();
        // Stop waits for the grace period; allow it on top of the default.
        let output = self
            .run(
                &["stop", "-t", &grace_secs, id],
                ENGINE_TIMEOUT + grace,
                "docker stop",
            )
            .await?;
        if !output.status.success() {
            let stderr = stderr_snippet(&output.stderr);
            if stderr.contains("No such container") {
                return Err(EngineError::NotFound(id.to_string()));
            }
            return Err(EngineError::CommandFailed(format!(
                "docker stop: {}",
                stderr
            )));
        }
        Ok(())
    }

    async fn pause(&self, id: &str) -> Result<(), EngineError> {
        self.run_ok(&["pause", id], "docker pause").await
    }

    async fn unpause(&self, id: &str) -> Result<(), EngineError> {
        self.run_ok(&["unpause", id], "docker unpause").await
    }

    async fn remove(&self, id: &str, force: bool) -> Result<(), EngineError> {
        let mut args = vec!["rm"];
        if force {
            args.push("-f");
        }
        args.push(id);
        self.run_ok(&args, "docker rm").await
    }

    async fn exec_detached(&self, id: &str, argv: &[&str]) -> Result<(), EngineError> {
        let mut args = vec!["exec", "-d", id];
        args.extend_from_slice(argv);
        self.run_ok(&args, "docker exec -d").await
    }

    async fn inspect(&self, id: &str) -> Result<ContainerState, EngineError> {
        let output = self
            .run(
                &[
                    "inspect",
                    "--format",
                    "{{.State.Status}} {{.State.Running}} {{.State.Paused}} {{.State.ExitCode}}",
                    id,
                ],
                ENGINE_TIMEOUT,
                "docker inspect",
            )
            .await?;
        if !output.status.success() {
            return Err(EngineError::NotFound(id.to_string()));
        }
        let text = String::from_utf8_lossy(&output.stdout);
        let mut fields = text.split_whitespace();
        let status = fields.next().unwrap_or("").to_string();
        let running = fields.next() == Some("true");
        let paused = fields.next() == Some("true");
        let exit_code = fields.next().and_then(|c| c.parse().ok());
        Ok(ContainerState {
            running,
            paused,
            exit_code: if running { None } else { exit_code },
            status,
        })
    }

    async fn list_by_label(
        &self,
        key: &str,
        value: &str,
    ) -> Result<Vec<ContainerInfo>, EngineError> {
        let filter = format!("label={}={}", key, value);
        let output = self
            .run(
                &["ps", "-a", "--filter", &filter, "--format", "{{json .}}"],
                ENGINE_TIMEOUT,
                "docker ps",
            )
            .await?;
        if !output.status.success() {
            return Err(EngineError::CommandFailed(format!(
                "docker ps: {}",
                stderr_snippet(&output.stderr)
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(parse_container_line)
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
                tracing::info!(container = %info.name, "removing orphaned container");
                self.remove(&info.id, true).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn validate_prerequisites(&self) -> ValidationResult {
        let mut problems = Vec::new();

        match self.run(&["--version"], ENGINE_TIMEOUT, "docker --version").await {
            Ok(output) if output.status.success() => {}
            _ => {
                problems.push("docker binary not found on PATH".to_string());
                return ValidationResult { ok: false, problems };
            }
        }

        match self.run(&["info", "--format", "{{.ServerVersion}}"], ENGINE_TIMEOUT, "docker info")
            .await
        {
            Ok(output) if output.status.success() => {}
            Ok(output) => problems.push(format!(
                "docker daemon not reachable: {}",
                stderr_snippet(&output.stderr)
            )),
            Err(e) => problems.push(format!("docker daemon not reachable: {}", e)),
        }

        ValidationResult {
            ok: problems.is_empty(),
            problems,
        }
    }

    async fn copy_into(&self, id: &str, src: &Path, dest: &str) -> Result<(), EngineError> {
        let src_str = src.display().to_string();
        let target = format!("{}:{}", id, dest);
        self.run_ok(&["cp", &src_str, &target], "docker cp").await
    }

    async fn changed_paths(&self, id: &str) -> Result<Vec<String>, EngineError> {
        let output = self.run(&["diff", id], ENGINE_TIMEOUT, "docker diff").await?;
        if !output.status.success() {
            return Err(EngineError::NotFound(id.to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            // Lines are `C /path`, `A /path`, `D /path`.
            .filter_map(|l| l.split_whitespace().nth(1).map(str::to_string))
            .collect())
    }
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod tests;
