//! # Usage Resolver (`maintenance::usage`)
//!
//! File: cli/src/maintenance/usage.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Removes images that no running container is using. The engine reports
//! one image reference per running container, in one of two shapes:
//!
//! - a literal `repository[:tag]` string. An image is in use when its name is
//!   a prefix of the reference.
//! - a 12-character lowercase hex id, printed when the engine no longer has a
//!   tag for the container's image. The id is inspected for its repo-tags,
//!   and an image is in use when its name appears inside any of them.
//!
//! References that are themselves critical are ignored, as they can never
//! justify keeping a non-critical image.
//!
//! ## Inspection Failures
//!
//! What a failed inspection means is governed by [`InspectFailurePolicy`]:
//!
//! - `SkipReference` (default): the failed reference cannot match anything;
//!   the remaining references are still checked.
//! - `AbortImage`: checking stops at the failed reference for every image,
//!   so an image only matched by later references counts as unused. This
//!   reproduces the behaviour of older cleanup scripts.
//!
//! Each opaque id is inspected once per pass, not once per image.
//!
use super::critical::CriticalAllowlist; // Names exempt from deletion.
use super::executor::{engine_output, Deletion, Executor};
use super::inventory::ImageRecord;
use super::report::{Pass, PassReport};
use crate::common::engine::ImageEngine;
use crate::core::error::Result;
use anyhow::Context; // For adding context to listing failures.
use serde::Deserialize; // The failure policy is read from `[usage]`.
use tracing::{debug, error};

const OPAQUE_ID_LEN: usize = 12;

/// What a failed inspection of a running container's image means.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum InspectFailurePolicy {
    #[default]
    SkipReference,
    AbortImage,
}

/// A running container's image reference as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunningReference {
    Literal(String),
    OpaqueId(String),
}

/// A running reference after inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedReference {
    Literal(String),
    Inspected { id: String, repo_tags: Vec<String> },
    InspectFailed { id: String },
}

/// True for tokens like `a7a187209cf4`.
pub fn is_opaque_id(token: &str) -> bool {
    token.len() == OPAQUE_ID_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

pub fn classify_reference(token: &str) -> RunningReference {
    if is_opaque_id(token) {
        RunningReference::OpaqueId(token.to_string())
    } else {
        RunningReference::Literal(token.to_string())
    }
}

/// Inspects every opaque id once. Failures are printed and kept as
/// `InspectFailed` so the matching policy can decide what they mean.
pub async fn resolve_references(
    engine: &dyn ImageEngine,
    references: Vec<RunningReference>,
) -> Vec<ResolvedReference> {
    let mut resolved = Vec::with_capacity(references.len());
    for reference in references {
        match reference {
            RunningReference::Literal(r) => resolved.push(ResolvedReference::Literal(r)),
            RunningReference::OpaqueId(id) => {
                let earlier = resolved
                    .iter()
                    .find(|r| match r {
                        ResolvedReference::Inspected { id: seen, .. }
                        | ResolvedReference::InspectFailed { id: seen } => *seen == id,
                        ResolvedReference::Literal(_) => false,
                    })
                    .cloned();
                if let Some(done) = earlier {
                    resolved.push(done);
                    continue;
                }
                match engine.inspect_repo_tags(&id).await {
                    Ok(repo_tags) => {
                        debug!("Running image {} resolves to {:?}", id, repo_tags);
                        resolved.push(ResolvedReference::Inspected { id, repo_tags });
                    }
                    Err(e) => {
                        error!("Failed to inspect '{}': {:?}", id, e);
                        println!("[ERROR] Inspecting image \"{}\": {}", id, engine_output(&e));
                        resolved.push(ResolvedReference::InspectFailed { id });
                    }
                }
            }
        }
    }
    resolved
}

/// Whether any running reference uses the image called `name`.
pub fn image_in_use(
    name: &str,
    references: &[ResolvedReference],
    allowlist: &CriticalAllowlist,
    policy: InspectFailurePolicy,
) -> bool {
    for reference in references {
        match reference {
            ResolvedReference::InspectFailed { .. } => match policy {
                InspectFailurePolicy::SkipReference => continue,
                InspectFailurePolicy::AbortImage => return false,
            },
            ResolvedReference::Inspected { repo_tags, .. } => {
                if repo_tags.iter().any(|t| allowlist.is_critical(t)) {
                    continue;
                }
                if repo_tags.iter().any(|t| t.contains(name)) {
                    return true;
                }
            }
            ResolvedReference::Literal(r) => {
                if allowlist.is_critical(r) {
                    continue;
                }
                if r.starts_with(name) {
                    return true;
                }
            }
        }
    }
    false
}

/// # Clean Unused Images (`clean_unused_images`)
///
/// Deletes every tagged, non-critical image that no running container uses.
///
/// Running references are read once, opaque ids among them are inspected
/// once each, and every inventory record is then checked with
/// [`image_in_use`]. `<none>` records are left to the untagged pass.
///
/// # Arguments
///
/// * `engine` - The container engine to list, inspect and delete through.
/// * `allowlist` - Critical name patterns, applied to both images and references.
/// * `policy` - What a failed inspection means for the image being checked.
/// * `executor` - Performs (or, in dry-run, announces) each deletion.
///
/// # Returns
///
/// * `Result<PassReport>` - Deleted, failed and kept references.
///
/// # Errors
///
/// Returns `Err` when either the image listing or the container listing
/// fails, before any deletion is issued.
pub async fn clean_unused_images(
    engine: &dyn ImageEngine,
    allowlist: &CriticalAllowlist,
    policy: InspectFailurePolicy,
    executor: &Executor<'_>,
) -> Result<PassReport> {
    println!("Executing \"{}\"", Pass::Unused);
    let mut report = PassReport::new(Pass::Unused);

    let records: Vec<ImageRecord> = engine
        .list_images()
        .await
        .context("Failed to list images")?;
    let running = engine
        .running_image_refs()
        .await
        .context("Failed to list running containers")?;

    let references = resolve_references(
        engine,
        running.iter().map(|r| classify_reference(r)).collect(),
    )
    .await;

    for record in &records {
        if record.is_untagged() {
            continue;
        }
        if allowlist.is_critical(&record.name) {
            report.keep(record.reference(), "critical image");
            continue;
        }
        if image_in_use(&record.name, &references, allowlist, policy) {
            report.keep(record.reference(), "in use");
            continue;
        }
        executor
            .delete(Deletion::by_reference(record.reference(), "unused"), &mut report)
            .await;
    }
    Ok(report)
}
