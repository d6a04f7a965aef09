//! # Pass Reports (`maintenance::report`)
//!
//! File: cli/src/maintenance/report.rs
//! Author: Christi Mahu
//!
//! Outcome bookkeeping for each cleanup pass and for a whole run.
//!
use std::fmt;

/// The cleanup passes, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Prune,
    Dangling,
    Untagged,
    Duplicates,
    Unused,
}

impl Pass {
    pub const ALL: [Pass; 5] = [
        Pass::Prune,
        Pass::Dangling,
        Pass::Untagged,
        Pass::Duplicates,
        Pass::Unused,
    ];
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pass::Prune => "prune images",
            Pass::Dangling => "clean dangling images",
            Pass::Untagged => "clean <none> images",
            Pass::Duplicates => "clean duplicate images",
            Pass::Unused => "clean unused images",
        })
    }
}

/// What one pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub pass: Pass,
    /// References deleted (or, in a dry run, that would have been).
    pub deleted: Vec<String>,
    /// References whose deletion failed, with the engine's output.
    pub failed: Vec<(String, String)>,
    /// Images considered but deliberately left in place, with the reason.
    pub kept: Vec<(String, String)>,
    /// Problems that stopped part of the pass without stopping the run.
    pub errors: Vec<String>,
}

impl PassReport {
    pub fn new(pass: Pass) -> Self {
        Self {
            pass,
            deleted: Vec::new(),
            failed: Vec::new(),
            kept: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn keep(&mut self, reference: impl Into<String>, reason: impl Into<String>) {
        self.kept.push((reference.into(), reason.into()));
    }

    pub fn summary_line(&self) -> String {
        format!(
            "{}: {} deleted, {} failed, {} kept, {} error(s)",
            self.pass,
            self.deleted.len(),
            self.failed.len(),
            self.kept.len(),
            self.errors.len()
        )
    }
}

/// Reports of every pass executed in one run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub reports: Vec<PassReport>,
}

impl RunSummary {
    pub fn total_deleted(&self) -> usize {
        self.reports.iter().map(|r| r.deleted.len()).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.reports.iter().map(|r| r.failed.len()).sum()
    }

    /// Every reference deleted during the run, in order.
    pub fn deleted(&self) -> impl Iterator<Item = &str> {
        self.reports
            .iter()
            .flat_map(|r| r.deleted.iter().map(String::as_str))
    }
}
