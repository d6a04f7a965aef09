//! # Critical-Image Filter (`maintenance::critical`)
//!
//! File: cli/src/maintenance/critical.rs
//! Author: Christi Mahu
//!
//! Infrastructure images (cluster control plane, networking, storage) must
//! survive every cleanup pass. The allowlist is a set of case-sensitive
//! substrings; an image whose name contains any of them is critical.
//!
//! The allowlist is built once from configuration and handed to each pass,
//! which consults it for every candidate.
//!
use crate::core::config::{CriticalConfig, DEFAULT_CRITICAL_PATTERNS};

/// Immutable set of substring patterns protecting images from deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticalAllowlist {
    patterns: Vec<String>,
}

impl CriticalAllowlist {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &CriticalConfig) -> Self {
        Self::new(config.effective_patterns())
    }

    /// True if `name` contains any allowlisted pattern.
    pub fn is_critical(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| name.contains(p.as_str()))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for CriticalAllowlist {
    fn default() -> Self {
        Self::new(DEFAULT_CRITICAL_PATTERNS)
    }
}
