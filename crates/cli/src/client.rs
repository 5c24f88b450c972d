// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands.
//!
//! Each action dials the per-repository socket, writes one request,
//! reads one response, and disconnects. Connection-refused is retried
//! a few times to cover the race between the daemon creating the
//! socket file and finishing `listen`.

use ccells_daemon::protocol::{Request, Response};
use ccells_daemon::protocol_wire::{self, ProtocolError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::io::BufReader;
use tokio::net::UnixStream;

/// Attempts made when the socket exists but refuses connections.
const CONNECT_ATTEMPTS: u32 = 3;
/// Spacing between connection attempts.
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(500);

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for ordinary IPC requests.
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("CCELLS_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for `create` requests (may include an image build).
pub fn timeout_create() -> Duration {
    parse_duration_ms("CCELLS_TIMEOUT_CREATE_MS").unwrap_or(Duration::from_secs(185))
}

/// Retry spacing override for tests.
fn connect_retry_delay() -> Duration {
    parse_duration_ms("CCELLS_CONNECT_RETRY_MS").unwrap_or(CONNECT_RETRY_DELAY)
}

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon not running")]
    DaemonNotRunning,

    #[error("could not connect to daemon: {0}")]
    ConnectFailed(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("{0}")]
    Rejected(String),

    #[error("daemon sent an unexpected response")]
    UnexpectedResponse,
}

/// Daemon client bound to one repository's socket.
#[derive(Debug)]
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// Client for an existing daemon; fails fast when the socket file
    /// is absent.
    pub fn connect(socket_path: &Path) -> Result<Self, ClientError> {
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }
        Ok(Self {
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Client that assumes the socket will appear (used during `up`
    /// bootstrap, where the dial retries cover the bind race).
    pub fn expecting(socket_path: &Path) -> Self {
        Self {
            socket_path: socket_path.to_path_buf(),
        }
    }

    async fn dial(&self) -> Result<UnixStream, ClientError> {
        let mut last_err = None;
        for attempt in 0..CONNECT_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(connect_retry_delay()).await;
            }
            match UnixStream::connect(&self.socket_path).await {
                Ok(stream) => return Ok(stream),
                Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
                    // Daemon created the file but hasn't finished
                    // listen() yet, or died; retry.
                    last_err = Some(e);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    last_err = Some(e);
                }
                Err(e) => return Err(ClientError::ConnectFailed(e.to_string())),
            }
        }
        Err(ClientError::ConnectFailed(
            last_err
                .map(|e| e.to_string())
                .unwrap_or_else(|| "connection refused".to_string()),
        ))
    }

    /// Send one request and read its response.
    pub async fn send_with_timeout(
        &self,
        request: &Request,
        timeout: Duration,
    ) -> Result<Response, ClientError> {
        let stream = self.dial().await?;
        let (read_half, mut write_half) = stream.into_split();

        protocol_wire::write_request(&mut write_half, request, timeout_ipc()).await?;

        let mut reader = BufReader::new(read_half);
        let response = protocol_wire::read_response(&mut reader, timeout).await?;
        Ok(response)
    }

    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        self.send_with_timeout(request, timeout_ipc()).await
    }

    /// Helper for requests that only need ok/error.
    pub async fn send_simple(&self, request: &Request) -> Result<(), ClientError> {
        let response = self.send(request).await?;
        if response.ok {
            Ok(())
        } else {
            Err(ClientError::Rejected(
                response.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }

    /// Helper for requests that return a data payload.
    pub async fn send_expecting_data(
        &self,
        request: &Request,
        timeout: Duration,
    ) -> Result<serde_json::Value, ClientError> {
        let response = self.send_with_timeout(request, timeout).await?;
        if !response.ok {
            return Err(ClientError::Rejected(
                response.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        response.data.ok_or(ClientError::UnexpectedResponse)
    }

    /// Liveness probe.
    pub async fn ping(&self) -> Result<(), ClientError> {
        self.send_simple(&Request::Ping).await
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
