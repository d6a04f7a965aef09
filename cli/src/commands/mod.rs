//! # dockmaint Command Modules
//!
//! File: cli/src/commands/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module aggregates the command handlers invoked from `main.rs`, plus
//! the options every command shares (configuration file, engine selection,
//! dry run) and the setup that turns them into a ready [`Pipeline`].
//!
//! ## Commands
//!
//! - `run`: every enabled pass, in order (`run.rs`)
//! - `prune`, `dangling`, `untagged`, `duplicates`, `unused`: a single pass
//!   (`run.rs`)
//! - `list`: annotated inventory, no deletions (`list.rs`)
//!

/// Lists the image inventory with critical and version annotations.
pub mod list;
/// Runs the full pipeline or a single pass.
pub mod run;

use crate::{
    common::engine,
    core::{
        config::{self, Backend, Config},
        error::Result,
    },
    maintenance::{critical::CriticalAllowlist, Pipeline},
};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use tracing::{debug, info};

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Configuration file to use instead of the user configuration.
    #[arg(long, global = true, env = "DOCKMAINT_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Container engine executable (overrides `engine.binary`), e.g. `podman`.
    #[arg(long, global = true, value_name = "BIN")]
    pub engine_bin: Option<String>,

    /// Engine backend (overrides `engine.backend`).
    #[arg(long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// Report what would be deleted without deleting anything.
    #[arg(long, global = true)]
    pub dry_run: bool,
}

/// Loads configuration, applies command-line overrides and validates.
pub fn load_config(args: &GlobalArgs) -> Result<Config> {
    let mut cfg = config::load_config(args.config.as_deref())
        .context("Failed to load dockmaint configuration")?;
    if let Some(bin) = &args.engine_bin {
        cfg.engine.binary = bin.clone();
    }
    if let Some(backend) = args.backend {
        cfg.engine.backend = backend;
    }
    config::finalize(cfg)
}

/// Connects to the configured engine and assembles the pipeline.
pub async fn build_pipeline(args: &GlobalArgs) -> Result<(Config, Pipeline)> {
    let cfg = load_config(args)?;
    let engine = engine::connect(&cfg.engine)
        .await
        .context("Failed to set up the container engine")?;
    let allowlist = CriticalAllowlist::from_config(&cfg.critical);
    debug!("Critical patterns: {:?}", allowlist.patterns());
    if args.dry_run {
        info!("Dry run: no image will be deleted.");
    }
    let pipeline = Pipeline::new(
        engine,
        allowlist,
        cfg.usage.on_inspect_failure,
        args.dry_run,
    );
    Ok((cfg, pipeline))
}
