//! # dockmaint Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module aggregates the core infrastructure components shared by every
//! command:
//!
//! - `config`: Configuration loading and validation
//! - `error`: Error types and the crate-wide `Result` alias
//!
//! ## Usage
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{MaintError, Result}; // For error handling
//! ```
//!
pub mod config;
pub mod error;
