//! Test helpers for behavioral specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// How long specs wait for the daemon socket.
pub const SOCKET_WAIT: Duration = Duration::from_secs(10);

/// Returns the path to a binary, resolving relative to the test binary
/// when CARGO_MANIFEST_DIR is stale (e.g. a shared target directory).
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    // The test binary lives at target/debug/deps/specs-<hash>, so its
    // grandparent is target/debug/ where the binaries are built.
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

pub fn ccells_binary() -> PathBuf {
    binary_path("ccells")
}

pub fn ccellsd_binary() -> PathBuf {
    binary_path("ccellsd")
}

/// A daemon process running against throwaway state and repo dirs.
pub struct DaemonUnderTest {
    pub child: Child,
    pub state_root: TempDir,
    pub repo: TempDir,
    pub socket: PathBuf,
}

impl DaemonUnderTest {
    /// Start `ccellsd` and wait for its socket to appear.
    pub fn start() -> Self {
        let state_root = TempDir::new().unwrap();
        let repo = TempDir::new().unwrap();

        let child = Command::new(ccellsd_binary())
            .arg("--repo")
            .arg(repo.path())
            .env("CCELLS_STATE_DIR", state_root.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("ccellsd should start");

        let socket = find_socket(state_root.path());

        Self {
            child,
            state_root,
            repo,
            socket,
        }
    }

    /// Send one JSON request line; return the parsed response.
    pub fn request(&self, request: serde_json::Value) -> serde_json::Value {
        request_on(&self.socket, request)
    }

    /// Path of the state snapshot file.
    pub fn state_file(&self) -> PathBuf {
        self.socket.parent().unwrap().join("state.json")
    }

    /// Wait for the daemon process to exit.
    pub fn wait_for_exit(&mut self, timeout: Duration) -> bool {
        let start = Instant::now();
        while start.elapsed() < timeout {
            if let Ok(Some(_)) = self.child.try_wait() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        false
    }
}

impl Drop for DaemonUnderTest {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// The daemon's state dir is `<root>/<repo-id>`; find the socket under it.
fn find_socket(state_root: &Path) -> PathBuf {
    let deadline = Instant::now() + SOCKET_WAIT;
    loop {
        if let Ok(entries) = std::fs::read_dir(state_root) {
            for entry in entries.flatten() {
                let candidate = entry.path().join("daemon.sock");
                if candidate.exists() {
                    return candidate;
                }
            }
        }
        if Instant::now() >= deadline {
            panic!("daemon socket never appeared under {}", state_root.display());
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

/// One request, one response, over a fresh connection.
pub fn request_on(socket: &Path, request: serde_json::Value) -> serde_json::Value {
    let mut stream = connect_with_retry(socket);
    let mut line = request.to_string();
    line.push('\n');
    stream.write_all(line.as_bytes()).unwrap();
    stream.flush().unwrap();

    let mut reader = BufReader::new(stream);
    let mut response = String::new();
    reader.read_line(&mut response).unwrap();
    serde_json::from_str(&response).expect("daemon should answer with JSON")
}

/// Dial with retries to cover the bind race.
fn connect_with_retry(socket: &Path) -> UnixStream {
    let deadline = Instant::now() + SOCKET_WAIT;
    loop {
        match UnixStream::connect(socket) {
            Ok(stream) => {
                stream
                    .set_read_timeout(Some(Duration::from_secs(10)))
                    .unwrap();
                return stream;
            }
            Err(_) if Instant::now() < deadline => {
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(e) => panic!("could not connect to {}: {}", socket.display(), e),
        }
    }
}
