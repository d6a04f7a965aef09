//! # dockmaint Main Entry Point
//!
//! File: cli/src/main.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This file serves as the main entry point for the dockmaint CLI, an
//! unattended container image-store cleaner meant to be run from cron or a
//! systemd timer. It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the command handlers
//! - Aborting cleanly on SIGINT/SIGTERM
//!
//! ## Architecture
//!
//! - Each command is a variant of the `Commands` enum, mapped to a handler in
//!   `commands/`.
//! - Options shared by all commands (`--config`, `--engine-bin`, `--backend`,
//!   `--dry-run`) live in `commands::GlobalArgs`.
//! - All errors are propagated to this level; any error exits with status 1.
//!
//! ## Examples
//!
//! ```bash
//! # Full cleanup
//! dockmaint run
//!
//! # Preview with debug logging
//! dockmaint -vv --dry-run run
//!
//! # Remove only `<none>` images
//! dockmaint none
//! ```
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // Command handlers and shared options
mod common; // Engine backends, process execution, signals
mod core; // Configuration and errors
mod maintenance; // The cleanup passes

use maintenance::report::Pass;

#[derive(Parser, Debug)]
#[command(
    name = "dockmaint",
    about = "Container image-store maintenance",
    long_about = "Removes dangling, untagged, superseded and unused container images\n\
                  while never touching images that match the critical allowlist.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(flatten)]
    global: commands::GlobalArgs,
}

#[derive(Parser, Debug)]
enum Commands {
    Run(commands::run::RunArgs),
    /// Run the engine's system prune.
    Prune,
    /// Remove dangling images.
    Dangling,
    /// Remove `<none>` images.
    #[command(alias = "none")]
    Untagged,
    /// Keep only the newest version tag of each image name.
    Duplicates,
    /// Remove images no running container uses.
    Unused,
    List(commands::list::ListArgs),
}

async fn dispatch(command: Commands, global: &commands::GlobalArgs) -> anyhow::Result<()> {
    match command {
        Commands::Run(args) => commands::run::handle_run(global, args).await,
        Commands::Prune => commands::run::handle_pass(global, Pass::Prune).await,
        Commands::Dangling => commands::run::handle_pass(global, Pass::Dangling).await,
        Commands::Untagged => commands::run::handle_pass(global, Pass::Untagged).await,
        Commands::Duplicates => commands::run::handle_pass(global, Pass::Duplicates).await,
        Commands::Unused => commands::run::handle_pass(global, Pass::Unused).await,
        Commands::List(args) => commands::list::handle_list(global, args).await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = tokio::select! {
        result = dispatch(cli.command, &cli.global) => result,
        name = common::signal::termination_signal() => {
            tracing::error!("{}", core::error::MaintError::Signal(name));
            println!("\nCatch signal: {}", name);
            std::process::exit(1);
        }
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
