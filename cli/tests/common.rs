//! # dockmaint CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared helpers for the integration tests. Besides locating the binary,
//! this module builds a throwaway "engine": a shell script answering the
//! engine subcommands dockmaint issues and appending every invocation to a
//! log file, so tests can assert exactly which commands were run.
//!

// Allow potentially unused code in this common module, as different test files might use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates an `assert_cmd::Command` for the compiled `dockmaint` binary.
pub fn dockmaint_cmd() -> Command {
    let mut cmd = Command::cargo_bin("dockmaint").expect("Failed to find dockmaint binary for testing");
    cmd.env_remove("DOCKMAINT_CONFIG").env_remove("RUST_LOG");
    cmd
}

/// A fake engine executable inside its own temporary directory.
pub struct FakeEngine {
    dir: TempDir,
    binary: PathBuf,
    log: PathBuf,
    config: PathBuf,
}

impl FakeEngine {
    /// Writes the script. `cases` are `case "$*" in` branches; unmatched
    /// invocations fail with exit status 125.
    #[cfg(unix)]
    pub fn new(cases: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let binary = dir.path().join("engine");
        let log = dir.path().join("calls.log");
        let config = dir.path().join("dockmaint.toml");

        let script = format!(
            "#!/bin/sh\necho \"$*\" >> '{}'\ncase \"$*\" in\n{}\n*) echo \"unexpected: $*\" >&2; exit 125 ;;\nesac\n",
            log.display(),
            cases
        );
        std::fs::write(&binary, script).expect("write fake engine");
        std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755))
            .expect("chmod fake engine");
        std::fs::write(&config, "").expect("write config");

        Self {
            dir,
            binary,
            log,
            config,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn config(&self) -> &Path {
        &self.config
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Every invocation so far, one argument string per call.
    pub fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Only the `rmi` invocations.
    pub fn removals(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("rmi "))
            .collect()
    }

    /// A `dockmaint` command wired to this engine and an empty config file.
    pub fn command(&self) -> Command {
        let mut cmd = dockmaint_cmd();
        cmd.arg("--config")
            .arg(&self.config)
            .arg("--engine-bin")
            .arg(&self.binary);
        cmd
    }
}
