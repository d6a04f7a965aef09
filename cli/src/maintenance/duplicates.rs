//! # Duplicate Resolver (`maintenance::duplicates`)
//!
//! File: cli/src/maintenance/duplicates.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! When an image name carries several version tags, only the newest one is
//! worth keeping. This pass:
//!
//! 1. Drops `<none>` tags and critical names from the inventory.
//! 2. Groups the remaining records by name, keeping first-seen tag order.
//! 3. For each group with more than one tag, parses every tag as a version
//!    (see [`ImageVersion`]) and keeps the first tag that is strictly newer
//!    than everything before it, starting from `0.0.0`.
//! 4. Deletes every other tag as `name:tag`.
//!
//! A tag that is not a version (`latest`, `stable-alpine`, ...) makes its
//! whole group unresolvable: the group is reported and left untouched, and
//! the pass moves on to the next group.
//!
use super::critical::CriticalAllowlist; // Names exempt from deletion.
use super::executor::{Deletion, Executor}; // Issues the actual `rmi` calls.
use super::inventory::ImageRecord;
use super::report::{Pass, PassReport};
use super::version::ImageVersion; // Tag parsing and precedence.
use crate::common::engine::ImageEngine;
use crate::core::error::{MaintError, Result};
use anyhow::Context; // For adding context to listing failures.
use tracing::{debug, info, warn};

/// One tag of an image group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedImage {
    pub tag: String,
    pub id: String,
}

/// All tags sharing an image name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageGroup {
    pub name: String,
    pub tags: Vec<TaggedImage>,
}

impl ImageGroup {
    pub fn reference(&self, tag: &TaggedImage) -> String {
        format!("{}:{}", self.name, tag.tag)
    }
}

/// Which tag of a group survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupResolution {
    pub kept: TaggedImage,
    pub kept_version: ImageVersion,
    pub superseded: Vec<TaggedImage>,
}

/// Groups tagged, non-critical records by name in first-seen order.
pub fn group_images(records: &[ImageRecord], allowlist: &CriticalAllowlist) -> Vec<ImageGroup> {
    let mut groups: Vec<ImageGroup> = Vec::new();
    for record in records {
        if record.is_untagged() || allowlist.is_critical(&record.name) {
            continue;
        }
        let entry = TaggedImage {
            tag: record.tag.clone(),
            id: record.id.clone(),
        };
        match groups.iter_mut().find(|g| g.name == record.name) {
            Some(group) => group.tags.push(entry),
            None => groups.push(ImageGroup {
                name: record.name.clone(),
                tags: vec![entry],
            }),
        }
    }
    groups
}

/// Picks the newest tag of `group`.
///
/// Returns `Ok(None)` when no tag is newer than `0.0.0`, in which case
/// nothing should be deleted. Equal versions keep the first-seen tag.
pub fn resolve_group(group: &ImageGroup) -> std::result::Result<Option<GroupResolution>, MaintError> {
    let versions = group
        .tags
        .iter()
        .map(|t| ImageVersion::parse(&t.tag))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut newest = ImageVersion::BASELINE;
    let mut newest_index = None;
    for (index, version) in versions.iter().enumerate() {
        if *version > newest {
            newest = version.clone();
            newest_index = Some(index);
        }
    }

    Ok(newest_index.map(|index| GroupResolution {
        kept: group.tags[index].clone(),
        kept_version: newest,
        superseded: group
            .tags
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, t)| t.clone())
            .collect(),
    }))
}

/// # Clean Duplicate Images (`clean_duplicate_images`)
///
/// Keeps only the newest version tag of every non-critical image name and
/// deletes the others as `name:<tag>`.
///
/// The inventory is fetched fresh, grouped with [`group_images`], and every
/// group holding more than one tag is resolved with [`resolve_group`]. A
/// group containing a tag that is not a version (`latest`, `1.25-alpine`) is
/// reported with an `[ERROR]` line and left alone; the other groups still
/// proceed.
///
/// # Arguments
///
/// * `engine` - The container engine to list and delete through.
/// * `allowlist` - Critical name patterns; matching images are never grouped.
/// * `executor` - Performs (or, in dry-run, announces) each deletion.
///
/// # Returns
///
/// * `Result<PassReport>` - Deleted, failed and kept references plus group errors.
///
/// # Errors
///
/// Returns `Err` only when the image listing fails. Individual deletion
/// failures are recorded in the report.
pub async fn clean_duplicate_images(
    engine: &dyn ImageEngine,
    allowlist: &CriticalAllowlist,
    executor: &Executor<'_>,
) -> Result<PassReport> {
    println!("Executing \"{}\"", Pass::Duplicates);
    let mut report = PassReport::new(Pass::Duplicates);

    let records = engine
        .list_images()
        .await
        .context("Failed to list images")?;

    for group in group_images(&records, allowlist)
        .into_iter()
        .filter(|g| g.tags.len() > 1)
    {
        debug!("Resolving {} tag(s) of '{}'", group.tags.len(), group.name);
        let resolution = match resolve_group(&group) {
            Ok(Some(resolution)) => resolution,
            Ok(None) => {
                warn!("No tag of '{}' is newer than 0.0.0; leaving it alone", group.name);
                report.keep(group.name.clone(), "no tag newer than 0.0.0");
                continue;
            }
            Err(e) => {
                println!("[ERROR] Resolving duplicates of \"{}\": {}", group.name, e);
                report.errors.push(format!("{}: {}", group.name, e));
                continue;
            }
        };

        info!(
            "Keeping {} (version {})",
            group.reference(&resolution.kept),
            resolution.kept_version
        );
        report.keep(group.reference(&resolution.kept), "newest version");
        let reason = format!("superseded by {}", resolution.kept.tag);
        for old in &resolution.superseded {
            executor
                .delete(
                    Deletion::by_reference(group.reference(old), reason.clone()),
                    &mut report,
                )
                .await;
        }
    }
    Ok(report)
}
