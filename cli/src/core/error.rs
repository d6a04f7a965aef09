//! # dockmaint Error Types
//!
//! File: cli/src/core/error.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module defines the error types used throughout dockmaint. Errors fall
//! into two tiers:
//!
//! - **Fatal**: configuration problems, a failing inventory listing, or an
//!   inventory that cannot be tokenized. These propagate up to `main`, which
//!   prints them and exits with status 1.
//! - **Recoverable**: a single failed deletion, inspection or version parse.
//!   These are reported with an `[ERROR]` prefix and the run continues.
//!
//! ## Architecture
//!
//! - `MaintError`: a `thiserror` enum for the specific failure kinds.
//! - `Result<T>`: an alias for `anyhow::Result<T>` so call sites can attach
//!   context with `.context(...)`.
//!
//! ## Examples
//!
//! ```rust
//! let out = process::run_capture(binary, &["images"]).await?;
//! if !out.success() {
//!     return Err(MaintError::EngineCommand {
//!         cmd: out.command.clone(),
//!         status: out.status_text(),
//!         output: out.combined(),
//!     })?;
//! }
//! ```
//!
use thiserror::Error;

/// Custom error type for dockmaint.
#[derive(Error, Debug)]
pub enum MaintError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engine command failed: {cmd}, Status: {status}, Output:\n{output}")]
    EngineCommand {
        cmd: String,
        status: String,
        output: String,
    },

    #[error("Unrecognised image listing line '{line}': {reason}")]
    InventoryParse { line: String, reason: String },

    #[error("Tag '{tag}' is not a semantic version: {reason}")]
    VersionParse { tag: String, reason: String },

    #[error("Docker API interaction failed: {source}")]
    DockerApi {
        #[from]
        source: bollard::errors::Error,
    },

    #[error("Interrupted by {0}")]
    Signal(&'static str),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let config_err = MaintError::Config("empty critical pattern".to_string());
        assert_eq!(
            config_err.to_string(),
            "Configuration error: empty critical pattern"
        );

        let engine_err = MaintError::EngineCommand {
            cmd: "docker images".into(),
            status: "exit status: 1".into(),
            output: "Cannot connect to the Docker daemon".into(),
        };
        assert_eq!(
            engine_err.to_string(),
            "Engine command failed: docker images, Status: exit status: 1, Output:\nCannot connect to the Docker daemon"
        );

        let version_err = MaintError::VersionParse {
            tag: "latest".into(),
            reason: "invalid digit".into(),
        };
        assert_eq!(
            version_err.to_string(),
            "Tag 'latest' is not a semantic version: invalid digit"
        );
    }

    #[test]
    fn test_signal_display() {
        assert_eq!(
            MaintError::Signal("SIGTERM").to_string(),
            "Interrupted by SIGTERM"
        );
    }
}
