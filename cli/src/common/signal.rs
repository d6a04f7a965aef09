//! # dockmaint Signal Handling (`common::signal`)
//!
//! File: cli/src/common/signal.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Provides a future that completes when the process receives SIGINT or
//! SIGTERM, yielding the signal's name. `main` races it against the command
//! being executed; when the signal wins, the command future is dropped and
//! the process exits with status 1. Deletions already issued are not undone.
//!
//! On non-Unix platforms only Ctrl+C is observed.
//!
use tracing::{info, warn};

/// Waits for SIGINT or SIGTERM and returns its name.
#[cfg(unix)]
pub async fn termination_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) =
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(term), Ok(int)) => (term, int),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Failed to register signal handlers: {}", e);
                return std::future::pending().await;
            }
        };

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    info!("Received {}", name);
    name
}

/// Fallback for non-Unix systems.
#[cfg(not(unix))]
pub async fn termination_signal() -> &'static str {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Received Ctrl+C");
            "SIGINT"
        }
        Err(e) => {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending().await
        }
    }
}
