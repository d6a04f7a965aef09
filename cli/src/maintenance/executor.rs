//! # Deletion Executor (`maintenance::executor`)
//!
//! File: cli/src/maintenance/executor.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Every deletion issued by any pass goes through [`Executor::delete`]. It
//! prints one `[OK]` or `[ERROR]` line per image on stdout, records the
//! outcome in the pass report, and never retries or propagates a failure:
//! one image that cannot be removed must not stop the rest of the cleanup.
//!
//! In dry-run mode no deletion reaches the engine; a `[DRY-RUN]` line is
//! printed and the reference is recorded as deleted, so the report shows what
//! a real run would do.
//!
use super::report::PassReport; // Where each outcome is recorded.
use crate::common::engine::ImageEngine;
use crate::core::error::MaintError; // To pull the engine's own output out of errors.
use tracing::{error, info};

/// One image selected for removal.
#[derive(Debug, Clone)]
pub struct Deletion {
    /// What the engine is asked to delete (`name:tag` or an id).
    pub reference: String,
    /// Shown to the user in place of `reference`.
    pub display: String,
    /// Why the image is being removed.
    pub reason: String,
    pub force: bool,
}

impl Deletion {
    /// Tag-qualified, non-forced deletion displayed as the reference itself.
    pub fn by_reference(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        let reference = reference.into();
        Self {
            display: reference.clone(),
            reference,
            reason: reason.into(),
            force: false,
        }
    }
}

pub struct Executor<'a> {
    engine: &'a dyn ImageEngine,
    dry_run: bool,
}

impl<'a> Executor<'a> {
    pub fn new(engine: &'a dyn ImageEngine, dry_run: bool) -> Self {
        Self { engine, dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// # Delete Image (`delete`)
    ///
    /// Removes one image and records the outcome in `report`.
    ///
    /// Prints `[OK] Image "<ref>" deleted successfully (<reason>)` on success
    /// and `[ERROR] Deleting "<ref>" (<reason>): <engine output>` on failure.
    /// Failures are never retried and never propagated. In dry-run mode the
    /// engine is not called and a `[DRY-RUN]` line is printed instead; the
    /// reference still counts as deleted in the report.
    ///
    /// # Arguments
    ///
    /// * `deletion` - What to remove, how to show it, and whether to force.
    /// * `report` - The current pass's report, updated in place.
    pub async fn delete(&self, deletion: Deletion, report: &mut PassReport) {
        if self.dry_run {
            println!(
                "[DRY-RUN] Would delete \"{}\" ({})",
                deletion.display, deletion.reason
            );
            report.deleted.push(deletion.reference);
            return;
        }

        match self
            .engine
            .remove_image(&deletion.reference, deletion.force)
            .await
        {
            Ok(()) => {
                info!("Deleted {} ({})", deletion.reference, deletion.reason);
                println!(
                    "[OK] Image \"{}\" deleted successfully ({})",
                    deletion.display, deletion.reason
                );
                report.deleted.push(deletion.reference);
            }
            Err(e) => {
                let output = engine_output(&e);
                error!("Failed to delete '{}': {:?}", deletion.reference, e);
                println!(
                    "[ERROR] Deleting \"{}\" ({}): {}",
                    deletion.display, deletion.reason, output
                );
                report.failed.push((deletion.reference, output));
            }
        }
    }
}

/// The engine's own output when available, otherwise the full error chain.
pub fn engine_output(e: &anyhow::Error) -> String {
    match e.downcast_ref::<MaintError>() {
        Some(MaintError::EngineCommand { output, .. }) => output.clone(),
        _ => format!("{:#}", e),
    }
}
