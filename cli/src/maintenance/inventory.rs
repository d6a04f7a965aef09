//! # Image Inventory Tokenizers (`maintenance::inventory`)
//!
//! File: cli/src/maintenance/inventory.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Every piece of engine CLI text output that dockmaint interprets is
//! converted into typed values here, so format fragility stays in one file:
//!
//! - **`parse_image_table`**: the tabular `images` listing -> `ImageRecord`s.
//! - **`parse_lines`**: one-token-per-line listings (`ps --format {{.Image}}`,
//!   `images -q`).
//! - **`parse_repo_tags`**: the bracketed `{{.RepoTags}}` inspect output.
//!
//! The `images` listing looks like:
//!
//! ```text
//! REPOSITORY          TAG       IMAGE ID       CREATED        SIZE
//! nginx               1.25.3    a8758716bb6a   2 weeks ago    187MB
//! <none>              <none>    5f1a2c3d4e5f   3 weeks ago    1.2GB
//! ```
//!
//! Only the first three columns matter; the remainder of the line is ignored.
//!
use crate::core::error::MaintError;

/// Tag (and repository) shown by the engine for untagged images.
pub const NONE_TAG: &str = "<none>";

/// One row of the image listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub name: String,
    pub tag: String,
    pub id: String,
}

impl ImageRecord {
    pub fn new(name: impl Into<String>, tag: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
            id: id.into(),
        }
    }

    /// `name:tag`, the form used for tag-qualified deletions.
    pub fn reference(&self) -> String {
        format!("{}:{}", self.name, self.tag)
    }

    pub fn is_untagged(&self) -> bool {
        self.tag == NONE_TAG
    }
}

/// Tokenizes the tabular image listing.
///
/// Blank lines and the `REPOSITORY` header are skipped. A line with fewer
/// than three columns means the output is not what we expect; that is an
/// error rather than a guess, since the records drive deletions.
pub fn parse_image_table(text: &str) -> Result<Vec<ImageRecord>, MaintError> {
    let mut records = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("REPOSITORY") {
            continue;
        }
        let mut columns = trimmed.split_whitespace();
        match (columns.next(), columns.next(), columns.next()) {
            (Some(name), Some(tag), Some(id)) => records.push(ImageRecord::new(name, tag, id)),
            _ => {
                return Err(MaintError::InventoryParse {
                    line: trimmed.to_string(),
                    reason: "expected at least REPOSITORY, TAG and IMAGE ID columns".to_string(),
                })
            }
        }
    }
    Ok(records)
}

/// Splits line-oriented output into its non-empty, trimmed lines.
pub fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses `{{.RepoTags}}` output such as `[myapp:1.0 myapp:latest]`.
///
/// Newlines and list brackets are stripped; an image without tags (`[]`)
/// yields an empty list.
pub fn parse_repo_tags(text: &str) -> Vec<String> {
    text.replace(['\n', '[', ']'], " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
