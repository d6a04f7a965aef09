//! # dockmaint Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared plumbing used by the command handlers and the maintenance passes:
//!
//! - **`engine`**: the `ImageEngine` trait and its CLI and Docker API backends.
//! - **`process`**: running external commands and capturing their output.
//! - **`signal`**: waiting for SIGINT/SIGTERM.
//!

/// Container engine abstraction and backends.
pub mod engine;
/// Execution of external processes with captured output.
pub mod process;
/// Termination signal handling.
pub mod signal;
