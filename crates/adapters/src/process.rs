// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The external process driver (§2's "External process driver" collaborator):
//! runs external binaries with a hard timeout and captured output, killing
//! the child on expiry.
//!
//! Every suspension point named in §5 — compile, simulate, synthesize
//! (the containerized flow), equivalence check — goes through here, so the
//! timeout-to-domain-status mapping in §7 has exactly one place it can go
//! wrong.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// The result of running one external command: mirrors the shape the
/// containerized-flow wrapper hands back upstream (`success`/`stdout`/
/// `stderr`/`command`), so the synthesis worker's signoff guardrail reads
/// the same way the source's does.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub command: String,
}

/// Drives one external binary invocation. Stateless; cheap to construct per
/// call or hold as a shared `Arc<ProcessDriver>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessDriver;

impl ProcessDriver {
    pub fn new() -> Self {
        Self
    }

    /// Run `program args...` with `timeout`, optionally in `cwd`. Never
    /// returns an `Err` for a non-zero exit — that is a normal, successful
    /// invocation of the driver whose caller inspects `success`. `Err` is
    /// reserved for the process never running at all (timeout, spawn
    /// failure).
    pub async fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: Option<&Path>,
        timeout: Duration,
    ) -> Result<ProcessResult, ProcessError> {
        let command_str = render_command(program, args);
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.kill_on_drop(true);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let output = run_with_timeout(cmd, timeout, &command_str).await?;
        Ok(to_process_result(&command_str, output))
    }
}

fn render_command(program: &str, args: &[String]) -> String {
    let mut parts = vec![program.to_string()];
    parts.extend(args.iter().cloned());
    parts.join(" ")
}

fn to_process_result(command: &str, output: Output) -> ProcessResult {
    ProcessResult {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        command: command.to_string(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("{description} timed out after {timeout_secs}s")]
    Timeout {
        description: String,
        timeout_secs: u64,
    },
    #[error("{description} failed to run: {source}")]
    Spawn {
        description: String,
        #[source]
        source: std::io::Error,
    },
}

/// Low-level timeout wrapper: runs `cmd`, killing it if `timeout` elapses
/// before it exits.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, ProcessError> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(ProcessError::Spawn {
            description: description.to_string(),
            source,
        }),
        Err(_elapsed) => Err(ProcessError::Timeout {
            description: description.to_string(),
            timeout_secs: timeout.as_secs(),
        }),
    }
}

/// Build a temporary filelist (one path per line) to pass to a compiler
/// invocation that might otherwise exceed command-line length limits, per
/// §4.3 step 2. Returns the path to the written file.
pub fn write_filelist(dir: &Path, name: &str, paths: &[PathBuf]) -> std::io::Result<PathBuf> {
    let path = dir.join(name);
    let body = paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    std::fs::write(&path, body)?;
    Ok(path)
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
