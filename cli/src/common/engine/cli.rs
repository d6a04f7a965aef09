//! # Command-Line Engine Backend
//!
//! File: cli/src/common/engine/cli.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Implements [`ImageEngine`] by invoking the engine CLI. The invocations are:
//!
//! | Operation            | Arguments                                |
//! |----------------------|------------------------------------------|
//! | `list_images`        | `images`                                 |
//! | `list_dangling`      | `images -f dangling=true -q`             |
//! | `running_image_refs` | `ps --format {{.Image}}`                 |
//! | `inspect_repo_tags`  | `inspect --format {{.RepoTags}} <ref>`   |
//! | `remove_image`       | `rmi [-f] <ref>`                         |
//! | `prune_system`       | `system prune -f`                        |
//!
//! Arguments are passed directly to the process, never through a shell.
//! Any non-zero exit becomes a `MaintError::EngineCommand` carrying the
//! command's combined output.
//!
use super::ImageEngine;
use crate::common::process::{self, CommandOutput};
use crate::core::error::{MaintError, Result};
use crate::maintenance::inventory::{self, ImageRecord};
use anyhow::anyhow;
use async_trait::async_trait;
use tracing::instrument;

/// Engine backend that shells out to `binary`.
#[derive(Debug, Clone)]
pub struct CliEngine {
    binary: String,
}

impl CliEngine {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Runs the engine and turns a non-zero exit into an error.
    async fn checked(&self, args: &[&str]) -> Result<CommandOutput> {
        let out = process::run_capture(&self.binary, args).await?;
        if !out.success() {
            return Err(anyhow!(MaintError::EngineCommand {
                cmd: out.command.clone(),
                status: out.status_text(),
                output: out.combined(),
            }));
        }
        Ok(out)
    }
}

#[async_trait]
impl ImageEngine for CliEngine {
    fn describe(&self) -> String {
        format!("{} (cli)", self.binary)
    }

    #[instrument(skip(self))]
    async fn list_images(&self) -> Result<Vec<ImageRecord>> {
        let out = self.checked(&["images"]).await?;
        Ok(inventory::parse_image_table(&out.stdout)?)
    }

    #[instrument(skip(self))]
    async fn list_dangling(&self) -> Result<Vec<String>> {
        let out = self
            .checked(&["images", "-f", "dangling=true", "-q"])
            .await?;
        Ok(inventory::parse_lines(&out.stdout))
    }

    #[instrument(skip(self))]
    async fn running_image_refs(&self) -> Result<Vec<String>> {
        let out = self.checked(&["ps", "--format", "{{.Image}}"]).await?;
        Ok(inventory::parse_lines(&out.stdout))
    }

    #[instrument(skip(self))]
    async fn inspect_repo_tags(&self, reference: &str) -> Result<Vec<String>> {
        let out = self
            .checked(&["inspect", "--format", "{{.RepoTags}}", reference])
            .await?;
        Ok(inventory::parse_repo_tags(&out.stdout))
    }

    #[instrument(skip(self))]
    async fn remove_image(&self, reference: &str, force: bool) -> Result<()> {
        if force {
            self.checked(&["rmi", "-f", reference]).await?;
        } else {
            self.checked(&["rmi", reference]).await?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn prune_system(&self) -> Result<String> {
        let out = self.checked(&["system", "prune", "-f"]).await?;
        Ok(out.combined())
    }
}
