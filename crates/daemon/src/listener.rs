// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! Accepts connections in parallel and spawns one handler task per
//! connection. Mutating operations serialize through the
//! orchestrator's per-branch mutex; read-only actions run fully
//! concurrently. Each connection carries one request and one response.

use std::sync::Arc;

use ccells_adapters::{ContainerEngine, GitAdapter, MuxAdapter};
use ccells_core::generate_branch_name;
use ccells_engine::{CreateOptions, DestroyOptions, Orchestrator, PairingProvider};
use tokio::io::BufReader;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Notify;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::protocol::{CreateParams, Request, Response};
use crate::protocol_wire::{self, ProtocolError};

/// Shared daemon context for all request handlers.
pub struct ListenCtx<M, E, G> {
    pub orchestrator: Orchestrator<M, E, G>,
    pub pairing: Option<Arc<dyn PairingProvider>>,
    pub shutdown: Arc<Notify>,
    pub start_time: std::time::Instant,
}

/// Listener task for accepting socket connections.
pub struct Listener<M, E, G> {
    socket: UnixListener,
    ctx: Arc<ListenCtx<M, E, G>>,
    stop: tokio::sync::watch::Receiver<bool>,
}

impl<M, E, G> Listener<M, E, G>
where
    M: MuxAdapter,
    E: ContainerEngine,
    G: GitAdapter,
{
    pub fn new(
        socket: UnixListener,
        ctx: Arc<ListenCtx<M, E, G>>,
        stop: tokio::sync::watch::Receiver<bool>,
    ) -> Self {
        Self { socket, ctx, stop }
    }

    /// Accept connections until shutdown is signalled, then drain
    /// in-flight handlers up to the grace window.
    pub async fn run(mut self) {
        let mut handlers = JoinSet::new();

        while !*self.stop.borrow() {
            tokio::select! {
                accepted = self.socket.accept() => {
                    match accepted {
                        Ok((stream, _)) => {
                            let ctx = Arc::clone(&self.ctx);
                            handlers.spawn(async move {
                                if let Err(e) = handle_connection(stream, &ctx).await {
                                    match e {
                                        ProtocolError::ConnectionClosed => {
                                            debug!("client disconnected")
                                        }
                                        ProtocolError::Timeout => warn!("connection timeout"),
                                        _ => error!("connection error: {}", e),
                                    }
                                }
                            });
                        }
                        Err(e) => {
                            error!("accept error: {}", e);
                        }
                    }
                }
                _ = self.stop.changed() => {
                    break;
                }
            }
        }

        // Stop accepting; give in-flight handlers a bounded window.
        drop(self.socket);
        let grace = crate::env::shutdown_grace();
        let drained = tokio::time::timeout(grace, async {
            while handlers.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!("shutdown grace elapsed with handlers still running");
            handlers.abort_all();
        }
        info!("listener drained");
    }
}

/// Handle a single client connection: one request, one response.
async fn handle_connection<M, E, G>(
    stream: UnixStream,
    ctx: &ListenCtx<M, E, G>,
) -> Result<(), ProtocolError>
where
    M: MuxAdapter,
    E: ContainerEngine,
    G: GitAdapter,
{
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let ipc_timeout = crate::env::ipc_timeout();
    let request = match protocol_wire::read_request(&mut reader, ipc_timeout).await {
        Ok(request) => request,
        Err(ProtocolError::Json(e)) => {
            // Malformed requests still get a usage-error response.
            let resp = Response::err(format!("malformed request: {}", e));
            protocol_wire::write_response(&mut write_half, &resp, ipc_timeout).await?;
            return Ok(());
        }
        Err(other) => return Err(other),
    };

    if matches!(request, Request::Ping | Request::PairStatus | Request::Ps) {
        debug!(request = ?request, "received query");
    } else {
        info!(request = ?request, "received request");
    }

    let shutting_down = matches!(request, Request::Shutdown);
    let response = handle_request(request, ctx).await;

    protocol_wire::write_response(&mut write_half, &response, ipc_timeout).await?;

    // The acknowledgement is on the wire; now the daemon can fall.
    if shutting_down {
        ctx.shutdown.notify_waiters();
        ctx.shutdown.notify_one();
    }

    Ok(())
}

/// Dispatch one request into the orchestrator or pairing provider.
async fn handle_request<M, E, G>(request: Request, ctx: &ListenCtx<M, E, G>) -> Response
where
    M: MuxAdapter,
    E: ContainerEngine,
    G: GitAdapter,
{
    match request {
        Request::Ping => Response::ok(),

        Request::Create(params) => handle_create(params, ctx).await,

        Request::Rm { name, delete_branch } => {
            let opts = DestroyOptions {
                keep_worktree: false,
                delete_branch,
            };
            match ctx.orchestrator.destroy(&name, opts).await {
                Ok(()) => Response::ok(),
                Err(e) => Response::err(e.to_string()),
            }
        }

        Request::Pause { name } => match ctx.orchestrator.pause(&name).await {
            Ok(()) => Response::ok(),
            Err(e) => Response::err(e.to_string()),
        },

        Request::Unpause { name } => match ctx.orchestrator.resume(&name).await {
            Ok(()) => Response::ok(),
            Err(e) => Response::err(e.to_string()),
        },

        Request::Rebuild { name } => match ctx.orchestrator.rebuild(&name).await {
            Ok(outcome) => Response::with_data(serde_json::json!({
                "container": outcome.container,
            })),
            Err(e) => Response::err(e.to_string()),
        },

        Request::DestroyAll => {
            let (destroyed, errors) = ctx
                .orchestrator
                .destroy_all(DestroyOptions::default())
                .await;
            if errors.is_empty() {
                Response::with_data(serde_json::json!({ "destroyed": destroyed }))
            } else {
                Response::err(format!(
                    "destroyed {} workstream(s), errors: {}",
                    destroyed,
                    errors.join("; ")
                ))
            }
        }

        Request::Pair(params) => match &ctx.pairing {
            Some(provider) => {
                let local = std::path::PathBuf::from(&params.local_path);
                match provider
                    .enable(
                        &params.branch,
                        &params.container_id,
                        &local,
                        params.previous_branch.clone(),
                    )
                    .await
                {
                    Ok(state) => Response::with_data(state),
                    Err(e) => Response::err(e.to_string()),
                }
            }
            None => Response::err("pairing is not available"),
        },

        Request::Unpair => match &ctx.pairing {
            Some(provider) => match provider.disable().await {
                Ok(()) => Response::ok(),
                Err(e) => Response::err(e.to_string()),
            },
            None => Response::err("pairing is not available"),
        },

        Request::PairStatus => match &ctx.pairing {
            Some(provider) => Response::with_data(provider.get_state()),
            None => Response::err("pairing is not available"),
        },

        Request::Ps => {
            let table = ctx.orchestrator.table();
            let entries: Vec<ccells_core::Workstream> = table.lock().iter().cloned().collect();
            Response::with_data(serde_json::json!({
                "uptime_secs": ctx.start_time.elapsed().as_secs(),
                "workstreams": entries,
            }))
        }

        // Acknowledged in handle_connection after the response is
        // written; nothing to do here.
        Request::Shutdown => Response::ok(),
    }
}

async fn handle_create<M, E, G>(mut params: CreateParams, ctx: &ListenCtx<M, E, G>) -> Response
where
    M: MuxAdapter,
    E: ContainerEngine,
    G: GitAdapter,
{
    if params.branch.is_empty() {
        if params.prompt.is_empty() {
            return Response::err("create requires a branch or a prompt");
        }
        let derived = generate_branch_name(&params.prompt);
        params.branch = {
            let table = ctx.orchestrator.table();
            let mut table = table.lock();
            table.dedup_branch(&derived)
        };
    }

    let opts = CreateOptions {
        branch: params.branch,
        prompt: params.prompt,
        title: params.title,
        runtime: params.runtime,
        skip_pane: params.skip_pane,
        copy_untracked: params.copy_untracked,
        untracked_files: params.untracked_files,
    };

    // Creates may build the base image on first run; cap the whole
    // request rather than trusting every adapter deadline to add up.
    match tokio::time::timeout(crate::env::create_timeout(), ctx.orchestrator.create(opts)).await {
        Ok(Ok(outcome)) => Response::with_data(serde_json::json!({
            "container": outcome.container,
        })),
        Ok(Err(e)) => Response::err(e.to_string()),
        Err(_) => Response::err("create timed out"),
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
