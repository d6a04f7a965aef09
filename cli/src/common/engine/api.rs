//! # Docker Engine API Backend
//!
//! File: cli/src/common/engine/api.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Implements [`ImageEngine`] on top of the `bollard` Docker API client,
//! for hosts where invoking the CLI is undesirable. The API returns
//! structured data, which is normalised into the same shapes the CLI backend
//! produces:
//!
//! - Image summaries expand into one `ImageRecord` per repo-tag; untagged
//!   images become a single `<none>`/`<none>` record.
//! - Image ids are shortened to the 12-character form the CLI prints, so
//!   running-container references that are bare ids look the same to the
//!   usage resolver.
//!
//! Docker API errors are wrapped in `MaintError::DockerApi` with context.
//!
use super::ImageEngine;
use crate::core::error::{MaintError, Result};
use crate::maintenance::inventory::{ImageRecord, NONE_TAG};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use bollard::{
    container::{ListContainersOptions, PruneContainersOptions},
    image::{ListImagesOptions, PruneImagesOptions, RemoveImageOptions},
    network::PruneNetworksOptions,
    Docker,
};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Length of the short image id shown by the CLI.
const SHORT_ID_LEN: usize = 12;

/// Engine backend using the Docker Engine API.
pub struct ApiEngine {
    docker: Docker,
}

impl ApiEngine {
    /// Connects to the local Docker daemon (socket or named pipe, honouring
    /// `DOCKER_HOST`) and verifies it answers.
    #[instrument]
    pub async fn connect() -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| anyhow!(MaintError::DockerApi { source: e }))
            .context("Failed to connect to Docker daemon. Is it running and accessible?")?;
        docker
            .ping()
            .await
            .map_err(|e| anyhow!(MaintError::DockerApi { source: e }))
            .context("Docker daemon did not answer ping")?;
        Ok(Self { docker })
    }
}

/// Strips the digest algorithm and shortens an image id to CLI form.
pub fn short_id(id: &str) -> String {
    let bare = id.strip_prefix("sha256:").unwrap_or(id);
    bare.chars().take(SHORT_ID_LEN).collect()
}

/// Splits `repo:tag` at the tag separator, ignoring a registry port colon.
pub fn split_repo_tag(repo_tag: &str) -> (String, String) {
    match repo_tag.rsplit_once(':') {
        Some((repo, tag)) if !tag.contains('/') => (repo.to_string(), tag.to_string()),
        _ => (repo_tag.to_string(), "latest".to_string()),
    }
}

/// Expands one image summary into inventory records.
pub fn records_from_summary(id: &str, repo_tags: &[String]) -> Vec<ImageRecord> {
    let id = short_id(id);
    let tagged: Vec<ImageRecord> = repo_tags
        .iter()
        .filter(|t| t.as_str() != "<none>:<none>")
        .map(|t| {
            let (name, tag) = split_repo_tag(t);
            ImageRecord::new(name, tag, id.clone())
        })
        .collect();
    if tagged.is_empty() {
        vec![ImageRecord::new(NONE_TAG, NONE_TAG, id)]
    } else {
        tagged
    }
}

fn api_error(e: bollard::errors::Error, what: String) -> anyhow::Error {
    anyhow!(MaintError::DockerApi { source: e }).context(what)
}

#[async_trait]
impl ImageEngine for ApiEngine {
    fn describe(&self) -> String {
        "docker engine api".to_string()
    }

    #[instrument(skip(self))]
    async fn list_images(&self) -> Result<Vec<ImageRecord>> {
        let options = Some(ListImagesOptions::<String> {
            all: false,
            ..Default::default()
        });
        let summaries = self
            .docker
            .list_images(options)
            .await
            .map_err(|e| api_error(e, "Failed to list images".to_string()))?;
        debug!("Docker API returned {} image summaries", summaries.len());
        Ok(summaries
            .iter()
            .flat_map(|s| records_from_summary(&s.id, &s.repo_tags))
            .collect())
    }

    #[instrument(skip(self))]
    async fn list_dangling(&self) -> Result<Vec<String>> {
        let mut filters = HashMap::new();
        filters.insert("dangling".to_string(), vec!["true".to_string()]);
        let options = Some(ListImagesOptions {
            all: false,
            filters,
            ..Default::default()
        });
        let summaries = self
            .docker
            .list_images(options)
            .await
            .map_err(|e| api_error(e, "Failed to list dangling images".to_string()))?;
        Ok(summaries.iter().map(|s| short_id(&s.id)).collect())
    }

    #[instrument(skip(self))]
    async fn running_image_refs(&self) -> Result<Vec<String>> {
        let options = Some(ListContainersOptions::<String> {
            all: false,
            ..Default::default()
        });
        let containers = self
            .docker
            .list_containers(options)
            .await
            .map_err(|e| api_error(e, "Failed to list running containers".to_string()))?;
        Ok(containers
            .into_iter()
            .filter_map(|c| c.image)
            .map(|image| {
                if image.starts_with("sha256:") {
                    short_id(&image)
                } else {
                    image
                }
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn inspect_repo_tags(&self, reference: &str) -> Result<Vec<String>> {
        let inspect = self
            .docker
            .inspect_image(reference)
            .await
            .map_err(|e| api_error(e, format!("Failed to inspect image '{}'", reference)))?;
        Ok(inspect.repo_tags.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn remove_image(&self, reference: &str, force: bool) -> Result<()> {
        let options = Some(RemoveImageOptions {
            force,
            noprune: false,
        });
        let results = self
            .docker
            .remove_image(reference, options, None)
            .await
            .map_err(|e| api_error(e, format!("Failed to remove image '{}'", reference)))?;
        for result in results {
            if let Some(deleted) = result.deleted {
                debug!("Deleted: {}", deleted);
            }
            if let Some(untagged) = result.untagged {
                debug!("Untagged: {}", untagged);
            }
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn prune_system(&self) -> Result<String> {
        let containers = self
            .docker
            .prune_containers(None::<PruneContainersOptions<String>>)
            .await
            .map_err(|e| api_error(e, "Failed to prune containers".to_string()))?;
        let networks = self
            .docker
            .prune_networks(None::<PruneNetworksOptions<String>>)
            .await
            .map_err(|e| api_error(e, "Failed to prune networks".to_string()))?;
        let images = self
            .docker
            .prune_images(None::<PruneImagesOptions<String>>)
            .await
            .map_err(|e| api_error(e, "Failed to prune images".to_string()))?;

        let reclaimed = containers.space_reclaimed.unwrap_or(0) + images.space_reclaimed.unwrap_or(0);
        let summary = format!(
            "Deleted {} container(s), {} network(s), {} image(s); reclaimed {} bytes",
            containers.containers_deleted.map_or(0, |c| c.len()),
            networks.networks_deleted.map_or(0, |n| n.len()),
            images.images_deleted.map_or(0, |i| i.len()),
            reclaimed
        );
        info!("{}", summary);
        Ok(summary)
    }
}
