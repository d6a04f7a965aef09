//! # Basic Cleanup Passes (`maintenance::cleanup`)
//!
//! File: cli/src/maintenance/cleanup.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The three passes that need no version or usage analysis:
//!
//! - **`prune_images`**: asks the engine to prune unused data. Its outcome
//!   never stops the run.
//! - **`clean_dangling_images`**: removes every image the engine reports as
//!   dangling.
//! - **`clean_untagged_images`**: force-removes, by id, every listed image
//!   whose tag is `<none>`, unless its repository name is critical.
//!
//! A failure to list images is fatal and returned as `Err`; deletion failures
//! are handled by the executor.
//!
use super::critical::CriticalAllowlist;
use super::executor::{engine_output, Deletion, Executor};
use super::report::{Pass, PassReport};
use crate::common::engine::ImageEngine;
use crate::core::error::Result;
use anyhow::Context;
use std::collections::HashSet;
use tracing::{info, warn};

/// Runs the engine's system prune.
pub async fn prune_images(engine: &dyn ImageEngine, executor: &Executor<'_>) -> Result<PassReport> {
    println!("Executing \"{}\"", Pass::Prune);
    let mut report = PassReport::new(Pass::Prune);
    if executor.is_dry_run() {
        println!("[DRY-RUN] Would prune unused engine data");
        return Ok(report);
    }
    match engine.prune_system().await {
        Ok(summary) => info!("Prune finished: {}", summary),
        Err(e) => {
            let output = engine_output(&e);
            warn!("Prune failed, continuing: {}", output);
            report.errors.push(output);
        }
    }
    Ok(report)
}

/// Removes dangling images.
pub async fn clean_dangling_images(
    engine: &dyn ImageEngine,
    executor: &Executor<'_>,
) -> Result<PassReport> {
    println!("Executing \"{}\"", Pass::Dangling);
    let mut report = PassReport::new(Pass::Dangling);

    let ids = engine
        .list_dangling()
        .await
        .context("Failed to list dangling images")?;
    info!("Found {} dangling image(s)", ids.len());

    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id.clone()) {
            continue;
        }
        executor
            .delete(Deletion::by_reference(id, "dangling"), &mut report)
            .await;
    }
    Ok(report)
}

/// Removes images listed with a `<none>` tag.
pub async fn clean_untagged_images(
    engine: &dyn ImageEngine,
    allowlist: &CriticalAllowlist,
    executor: &Executor<'_>,
) -> Result<PassReport> {
    println!("Executing \"{}\"", Pass::Untagged);
    let mut report = PassReport::new(Pass::Untagged);

    let records = engine
        .list_images()
        .await
        .context("Failed to list images")?;

    let mut seen = HashSet::new();
    for record in records.iter().filter(|r| r.is_untagged()) {
        if allowlist.is_critical(&record.name) {
            report.keep(record.reference(), "critical image");
            continue;
        }
        // The same id can appear on several <none> rows.
        if !seen.insert(record.id.clone()) {
            continue;
        }
        let deletion = Deletion {
            reference: record.id.clone(),
            display: format!("{} ({})", record.name, record.id),
            reason: "tag <none>".to_string(),
            force: true,
        };
        executor.delete(deletion, &mut report).await;
    }
    Ok(report)
}
