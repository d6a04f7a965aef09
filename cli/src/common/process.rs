//! # dockmaint Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Thin wrapper around `tokio::process::Command` used by the CLI engine
//! backend. Every invocation runs to completion and captures stdout, stderr
//! and the exit status. There is no timeout: a hung engine command blocks
//! the run.
//!
//! A command that cannot be spawned at all (binary missing, permission
//! denied) is an `Err`; a command that ran and exited non-zero is an `Ok`
//! whose `success()` is false. Callers decide which tier the failure belongs to.
//!
//! Dropping the future returned by [`run_capture`] (as `main` does when a
//! termination signal arrives) kills the child, so no engine command keeps
//! running after dockmaint has exited. Work the engine already finished is
//! not undone.
//!
//! ## Usage
//!
//! ```rust
//! let out = process::run_capture("docker", &["ps", "--format", "{{.Image}}"]).await?;
//! if out.success() {
//!     for line in out.stdout.lines() { /* ... */ }
//! }
//! ```
//!
use crate::core::error::Result;
use anyhow::Context;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::{debug, instrument};

/// Captured result of one external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// The command line as it would be typed, for messages.
    pub command: String,
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Exit code as text, or a note that the process was killed by a signal.
    pub fn status_text(&self) -> String {
        match self.status.code() {
            Some(code) => code.to_string(),
            None => "terminated by signal".to_string(),
        }
    }

    /// Stdout followed by stderr, trimmed. This is what error lines show.
    pub fn combined(&self) -> String {
        let mut text = String::new();
        text.push_str(self.stdout.trim_end());
        let err = self.stderr.trim_end();
        if !err.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(err);
        }
        text.trim().to_string()
    }
}

/// Runs `program` with `args` and waits for it to finish, capturing output.
#[instrument(skip(args), fields(args = ?args))]
pub async fn run_capture(program: &str, args: &[&str]) -> Result<CommandOutput> {
    let command = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");
    debug!("Running: {}", command);

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("Failed to execute '{}'", command))?;

    let captured = CommandOutput {
        command,
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    debug!(
        "'{}' finished with status {}",
        captured.command,
        captured.status_text()
    );
    Ok(captured)
}
