//! # dockmaint Container Engine Interface
//!
//! File: cli/src/common/engine/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module is the single boundary between dockmaint and the container
//! engine. The cleanup passes only ever talk to an [`ImageEngine`]; which
//! implementation sits behind it is chosen from configuration:
//!
//! - **`cli`**: `CliEngine` spawns the engine's command-line tool (`docker`
//!   by default, or any CLI-compatible engine such as `podman`) and tokenizes
//!   its text output.
//! - **`api`**: `ApiEngine` talks to the Docker Engine API over the local
//!   socket using `bollard`.
//!
//! Both produce the same typed values, so every pass behaves identically
//! regardless of backend.
//!
//! ## Failure Semantics
//!
//! Every method returns `Err` when the engine reports failure. Whether that
//! is fatal (inventory listings) or merely logged (deletions, inspections)
//! is decided by the caller, not here.
//!
use crate::core::config::{Backend, EngineConfig};
use crate::core::error::Result;
use crate::maintenance::inventory::ImageRecord;
use async_trait::async_trait;
use tracing::info;

/// Docker Engine API backend.
pub mod api;
/// Command-line backend.
pub mod cli;
/// In-memory engine for unit tests.
#[cfg(test)]
pub mod fake;

pub use api::ApiEngine;
pub use cli::CliEngine;

/// Operations the cleanup passes need from a container engine.
#[async_trait]
pub trait ImageEngine: Send + Sync {
    /// Short human-readable description, used in logs.
    fn describe(&self) -> String;

    /// Lists every local image as `(name, tag, id)` records.
    async fn list_images(&self) -> Result<Vec<ImageRecord>>;

    /// Lists the ids of dangling images.
    async fn list_dangling(&self) -> Result<Vec<String>>;

    /// Image references of the currently running containers, one per
    /// container. A reference is either a `repository[:tag]` string or a
    /// 12-character image id when the engine no longer knows a tag for it.
    async fn running_image_refs(&self) -> Result<Vec<String>>;

    /// Repo-tags of the image behind `reference`.
    async fn inspect_repo_tags(&self, reference: &str) -> Result<Vec<String>>;

    /// Deletes an image by `name:tag` or id.
    async fn remove_image(&self, reference: &str, force: bool) -> Result<()>;

    /// Prunes unused engine data; returns a short summary of what happened.
    async fn prune_system(&self) -> Result<String>;
}

/// Builds the engine selected by `config`.
pub async fn connect(config: &EngineConfig) -> Result<Box<dyn ImageEngine>> {
    let engine: Box<dyn ImageEngine> = match config.backend {
        Backend::Cli => Box::new(CliEngine::new(config.binary.clone())),
        Backend::Api => Box::new(ApiEngine::connect().await?),
    };
    info!("Using container engine: {}", engine.describe());
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_cli_backend() {
        let config = EngineConfig {
            binary: "podman".to_string(),
            backend: Backend::Cli,
        };
        let engine = connect(&config).await.unwrap();
        assert_eq!(engine.describe(), "podman (cli)");
    }
}
