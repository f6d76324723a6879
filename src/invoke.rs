//! External toolchain invocation.
//!
//! Every invocation is a structured argv vector; nothing goes through a
//! shell. A nonzero exit is an ordinary result, not an error: the round-trip
//! engine treats tool-reported failure as data. Each invocation is bounded
//! by the configured timeout and killed on the deadline.

use crate::config::RunConfig;
use std::ffi::OsStr;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How a toolchain invocation concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    /// The process ran to completion; `None` means it died to a signal.
    Exited(Option<i32>),
    /// Killed by the harness at the invocation deadline.
    TimedOut,
    /// The process could not be run at all; stdout/stderr carry no meaning.
    StartFailed(String),
}

impl std::fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolStatus::Exited(Some(code)) => write!(f, "exit code {code}"),
            ToolStatus::Exited(None) => f.write_str("terminated by signal"),
            ToolStatus::TimedOut => f.write_str("timed out"),
            ToolStatus::StartFailed(reason) => write!(f, "failed to start: {reason}"),
        }
    }
}

/// Captured result of one toolchain invocation. Fresh per call, never
/// shared across examples.
#[derive(Debug)]
pub struct ToolInvocationResult {
    pub status: ToolStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolInvocationResult {
    fn start_failed(reason: String) -> Self {
        Self {
            status: ToolStatus::StartFailed(reason),
            stdout: Vec::new(),
            stderr: Vec::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == ToolStatus::Exited(Some(0))
    }

    /// Whether the process actually ran, making captured streams meaningful.
    pub fn started(&self) -> bool {
        !matches!(self.status, ToolStatus::StartFailed(_))
    }
}

#[derive(Debug, Clone)]
pub struct Invoker {
    launcher: Vec<String>,
    timeout: Duration,
}

impl Invoker {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            launcher: config.tool_launcher.clone(),
            timeout: config.timeout,
        }
    }

    /// Run the toolchain with `args` appended to the launcher argv.
    ///
    /// `stdin` is piped to the child verbatim when given, otherwise the
    /// child's stdin is closed. With `stdout_redirect` the child's stdout
    /// goes straight to that file and the captured stdout buffer stays
    /// empty; stderr is captured either way.
    pub fn run(
        &self,
        args: &[&OsStr],
        stdin: Option<&[u8]>,
        stdout_redirect: Option<&Path>,
    ) -> ToolInvocationResult {
        let mut cmd = Command::new(&self.launcher[0]);
        cmd.args(&self.launcher[1..]);
        cmd.args(args);
        cmd.stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stderr(Stdio::piped());
        match stdout_redirect {
            Some(path) => {
                let file = match File::create(path) {
                    Ok(file) => file,
                    Err(err) => {
                        return ToolInvocationResult::start_failed(format!(
                            "create capture file {}: {err}",
                            path.display()
                        ))
                    }
                };
                cmd.stdout(Stdio::from(file));
            }
            None => {
                cmd.stdout(Stdio::piped());
            }
        }

        tracing::debug!(tool = %self.launcher[0], ?args, "invoke");
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                return ToolInvocationResult::start_failed(format!(
                    "spawn {}: {err}",
                    self.launcher[0]
                ))
            }
        };

        if let Some(payload) = stdin {
            if let Some(mut pipe) = child.stdin.take() {
                // the tool may exit before draining its input
                let _ = pipe.write_all(payload);
            }
        }

        let start = Instant::now();
        let mut timed_out = false;
        loop {
            match child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) => {}
                Err(err) => {
                    let _ = child.kill();
                    return ToolInvocationResult::start_failed(format!("poll tool: {err}"));
                }
            }
            if start.elapsed() > self.timeout {
                timed_out = true;
                let _ = child.kill();
                break;
            }
            std::thread::sleep(POLL_INTERVAL);
        }

        let output = match child.wait_with_output() {
            Ok(output) => output,
            Err(err) => {
                return ToolInvocationResult::start_failed(format!("collect tool output: {err}"))
            }
        };
        let status = if timed_out {
            ToolStatus::TimedOut
        } else {
            ToolStatus::Exited(output.status.code())
        };
        ToolInvocationResult {
            status,
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}
