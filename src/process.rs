//! Process utilities for commands that run external programs.

use crate::config::ToolError;
use std::fmt;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};

#[cfg(unix)]
use std::os::unix::process::ExitStatusExt;

fn exit_status_code_parts(code: Option<i32>, _signal: Option<i32>) -> Option<i32> {
    if let Some(code) = code {
        return Some(code);
    }
    #[cfg(unix)]
    {
        if let Some(signal) = _signal {
            return Some(128 + signal);
        }
    }
    None
}

/// Extract exit code from ExitStatus, using 128+signal for signal-terminated processes on Unix.
pub(crate) fn exit_status_code(status: &std::process::ExitStatus) -> Option<i32> {
    let code = status.code();
    #[cfg(unix)]
    let signal = status.signal();
    #[cfg(not(unix))]
    let signal = None;
    exit_status_code_parts(code, signal)
}

/// Attempt to capture the exit code from a child process.
/// Tries non-blocking first, falls back to blocking wait if process hasn't exited.
async fn capture_exit_code(child: &mut Child) -> Option<i32> {
    match child.try_wait() {
        Ok(Some(status)) => exit_status_code(&status),
        Ok(None) => child
            .wait()
            .await
            .ok()
            .and_then(|status| exit_status_code(&status)),
        Err(_) => None,
    }
}

/// Stream types for child processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputStream {
    Stdout,
    Stderr,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputStream::Stdout => write!(f, "stdout"),
            OutputStream::Stderr => write!(f, "stderr"),
        }
    }
}

/// Errors occurring while waiting for child process output.
#[derive(Debug, Error)]
pub(crate) enum OutputWaitError {
    /// Error reading from a stream.
    #[error("{stream} read failed: {source}")]
    Read {
        stream: OutputStream,
        #[source]
        source: std::io::Error,
        /// The exit code of the process if it has already exited.
        exit_code: Option<i32>,
    },
    /// Error waiting for the process to exit.
    #[error("wait failed: {source}")]
    Wait {
        #[source]
        source: std::io::Error,
    },
}

/// Output captured from a finished program
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl CapturedOutput {
    /// Stdout followed by stderr
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Run a program to completion, capturing stdout and stderr
///
/// No timeout is applied; the caller waits until the program exits.
pub(crate) async fn run_captured(
    program: &str,
    args: &[String],
) -> Result<CapturedOutput, ToolError> {
    tracing::debug!(program = %program, ?args, "Running program");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ToolError::execution(format!("failed to start '{}': {}", program, e)))?;

    let (stdout, stderr, status) = wait_for_child_output(&mut child).await.map_err(|e| {
        if let OutputWaitError::Read { exit_code, .. } = &e {
            tracing::debug!(program = %program, ?exit_code, "Output read failed");
        }
        ToolError::execution(format!("'{}' {}", program, e))
    })?;

    Ok(CapturedOutput {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        exit_code: exit_status_code(&status),
    })
}

/// Wait for child output, reading stdout/stderr concurrently to avoid deadlock.
async fn wait_for_child_output(
    child: &mut Child,
) -> Result<(Vec<u8>, Vec<u8>, std::process::ExitStatus), OutputWaitError> {
    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();

    let stdout_fut = async move {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout_pipe {
            out.read_to_end(&mut buf)
                .await
                .map_err(|e| (OutputStream::Stdout, e))?;
        }
        Ok::<_, (OutputStream, std::io::Error)>(buf)
    };

    let stderr_fut = async move {
        let mut buf = Vec::new();
        if let Some(mut err) = stderr_pipe {
            err.read_to_end(&mut buf)
                .await
                .map_err(|e| (OutputStream::Stderr, e))?;
        }
        Ok::<_, (OutputStream, std::io::Error)>(buf)
    };

    let (stdout, stderr) = match tokio::try_join!(stdout_fut, stderr_fut) {
        Ok(result) => result,
        Err((stream, e)) => {
            let _ = child.kill().await;
            let exit_code = capture_exit_code(child).await;
            return Err(OutputWaitError::Read {
                stream,
                source: e,
                exit_code,
            });
        }
    };

    let status = child
        .wait()
        .await
        .map_err(|e| OutputWaitError::Wait { source: e })?;

    Ok((stdout, stderr, status))
}
