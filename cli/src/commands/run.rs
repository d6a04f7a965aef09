//! # dockmaint Run Handler
//!
//! File: cli/src/commands/run.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Implements `dockmaint run` and the single-pass commands (`prune`,
//! `dangling`, `untagged`, `duplicates`, `unused`).
//!
//! ## Workflow
//!
//! 1. Load configuration and connect to the engine (`build_pipeline`).
//! 2. Determine the passes: for `run`, every pass enabled under `[passes]`
//!    minus any `--skip`; for a single-pass command, just that pass.
//! 3. Execute them in order. A fatal error (inventory listing failed) aborts
//!    the remaining passes and propagates to `main`, which exits with 1.
//! 4. Print a summary line per pass and the elapsed time.
//!
//! Individual deletion failures do not change the exit status.
//!
//! ## Usage
//!
//! ```bash
//! # Everything, as a cron job would run it
//! dockmaint run
//!
//! # Skip the prune and see what the rest would do
//! dockmaint run --skip prune --dry-run
//!
//! # Only drop superseded versions, using podman
//! dockmaint --engine-bin podman duplicates
//! ```
//!
use super::{build_pipeline, GlobalArgs};
use crate::{
    core::error::Result,
    maintenance::{
        enabled_passes,
        report::{Pass, RunSummary},
        Pipeline,
    },
};
use chrono::Local; // Start timestamp and elapsed time.
use clap::{Parser, ValueEnum}; // For parsing command-line arguments.
use tracing::info;

/// Pass names accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassName {
    Prune,
    Dangling,
    #[value(alias = "none")]
    Untagged,
    Duplicates,
    Unused,
}

impl From<PassName> for Pass {
    fn from(name: PassName) -> Self {
        match name {
            PassName::Prune => Pass::Prune,
            PassName::Dangling => Pass::Dangling,
            PassName::Untagged => Pass::Untagged,
            PassName::Duplicates => Pass::Duplicates,
            PassName::Unused => Pass::Unused,
        }
    }
}

/// # Run Arguments (`RunArgs`)
#[derive(Parser, Debug)]
#[command(about = "Run every enabled cleanup pass in order")]
pub struct RunArgs {
    /// Pass to leave out of this run. May be given more than once.
    #[arg(long, value_enum, value_name = "PASS")]
    skip: Vec<PassName>,
}

/// # Handle Run Command (`handle_run`)
///
/// Entry point for `dockmaint run`. Loads configuration, connects to the
/// engine and runs every pass enabled under `[passes]`, minus those named
/// with `--skip`, in pipeline order.
///
/// # Arguments
///
/// * `global` - Options shared by all commands (config file, engine, dry run).
/// * `args` - The parsed `run` arguments.
///
/// # Returns
///
/// * `Result<()>` - `Ok(())` once every pass ran, even if some deletions failed.
///
/// # Errors
///
/// Configuration or engine setup errors, and any fatal pass error (an
/// inventory listing failed), which stops the remaining passes.
pub async fn handle_run(global: &GlobalArgs, args: RunArgs) -> Result<()> {
    let (cfg, pipeline) = build_pipeline(global).await?;
    let skipped: Vec<Pass> = args.skip.into_iter().map(Pass::from).collect();
    let passes: Vec<Pass> = enabled_passes(&cfg.passes)
        .into_iter()
        .filter(|p| !skipped.contains(p))
        .collect();
    info!("Running passes: {:?}", passes);
    execute(&pipeline, &passes).await.map(|_| ())
}

/// Handles the single-pass commands.
pub async fn handle_pass(global: &GlobalArgs, pass: Pass) -> Result<()> {
    let (_, pipeline) = build_pipeline(global).await?;
    execute(&pipeline, &[pass]).await.map(|_| ())
}

/// Runs `passes` and prints the outcome summary.
pub async fn execute(pipeline: &Pipeline, passes: &[Pass]) -> Result<RunSummary> {
    let started = Local::now();
    info!("Maintenance started at {}", started.to_rfc3339());

    let summary = pipeline.run(passes).await?;

    let elapsed = Local::now().signed_duration_since(started);
    println!();
    for report in &summary.reports {
        println!("{}", report.summary_line());
    }
    println!(
        "Done: {} image(s) deleted, {} deletion(s) failed in {}.{:03}s",
        summary.total_deleted(),
        summary.total_failed(),
        elapsed.num_seconds(),
        elapsed.num_milliseconds().rem_euclid(1000)
    );
    Ok(summary)
}
