//! Shared process fixtures for integration tests.
//!
//! Starts the simulator binary on an ephemeral port and speaks plain HTTP/1.1
//! to it over `TcpStream`.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// A running simulator process, killed on drop if still alive.
pub struct SimulatorGuard {
    child: Child,
    pub addr: String,
}

impl SimulatorGuard {
    /// Starts the simulator with a named configuration file from `tests/fixtures/`.
    pub fn start_with_config(name: &str, extra: &[&str]) -> Self {
        let config = fixture(name);
        let config = config.to_str().expect("fixture path should be UTF-8");
        let mut args = vec!["--config", config];
        args.extend_from_slice(extra);
        Self::start(&args)
    }

    /// Starts the simulator with `args` plus `--bind` on a free port and
    /// waits until it answers.
    pub fn start(args: &[&str]) -> Self {
        let addr = allocate_bind_addr();
        let child = Command::new(env!("CARGO_BIN_EXE_device-sim"))
            .args(args)
            .args(["--bind", &addr])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("device-sim process should spawn");
        let guard = Self { child, addr };
        wait_for_server(&guard.addr, Duration::from_secs(8));
        guard
    }

    pub fn get(&self, path: &str) -> Result<(u16, String), String> {
        http_request(&self.addr, "GET", path, None)
    }

    pub fn post(&self, path: &str, body: &str) -> Result<(u16, String), String> {
        http_request(&self.addr, "POST", path, Some(body))
    }

    /// Sends `POST /api/shutdown` and waits for the process to exit.
    ///
    /// The connection may drop before a reply is read; that is tolerated.
    /// Returns whether the process exited successfully within `timeout`.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        let _ = http_request(&self.addr, "POST", "/api/shutdown", None);
        let start = Instant::now();
        while start.elapsed() < timeout {
            if let Ok(Some(status)) = self.child.try_wait() {
                return status.success();
            }
            thread::sleep(Duration::from_millis(25));
        }
        false
    }
}

impl Drop for SimulatorGuard {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn allocate_bind_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("ephemeral port bind should succeed");
    let addr = listener
        .local_addr()
        .expect("local_addr should be available")
        .to_string();
    drop(listener);
    addr
}

fn wait_for_server(bind_addr: &str, timeout: Duration) {
    let start = Instant::now();
    loop {
        if let Ok((status, _)) = http_request(bind_addr, "GET", "/shelly", None) {
            if status == 200 {
                return;
            }
        }

        if start.elapsed() >= timeout {
            panic!("timed out waiting for simulator on {bind_addr}");
        }

        thread::sleep(Duration::from_millis(50));
    }
}

/// Sends one request with `Connection: close` and returns status and body.
pub fn http_request(
    bind_addr: &str,
    method: &str,
    path: &str,
    body: Option<&str>,
) -> Result<(u16, String), String> {
    let mut stream = TcpStream::connect(bind_addr).map_err(|err| format!("connect: {err}"))?;
    let body = body.unwrap_or("");
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: {bind_addr}\r\nConnection: close\r\n\
         Content-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    stream
        .write_all(request.as_bytes())
        .map_err(|err| format!("write: {err}"))?;

    let mut raw = String::new();
    stream
        .read_to_string(&mut raw)
        .map_err(|err| format!("read: {err}"))?;

    let (head, body) = raw
        .split_once("\r\n\r\n")
        .ok_or_else(|| "invalid HTTP response".to_string())?;
    let status_line = head
        .lines()
        .next()
        .ok_or_else(|| "missing status line".to_string())?;
    let status_code = status_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| "missing status code".to_string())?
        .parse::<u16>()
        .map_err(|err| format!("invalid status code: {err}"))?;

    Ok((status_code, body.to_string()))
}
