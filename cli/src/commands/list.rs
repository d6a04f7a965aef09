//! # dockmaint List Handler
//!
//! File: cli/src/commands/list.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Implements `dockmaint list`: prints the engine's image inventory with two
//! annotations per image, whether its name matches the critical allowlist and
//! how its tag parses as a version. Useful to check configuration before the
//! first real run. Never deletes anything.
//!
use super::{build_pipeline, GlobalArgs};
use crate::{
    core::error::Result,
    maintenance::{critical::CriticalAllowlist, inventory::ImageRecord, version::ImageVersion},
};
use clap::Parser;

/// # List Arguments (`ListArgs`)
#[derive(Parser, Debug)]
#[command(about = "Show the image inventory with critical and version annotations")]
pub struct ListArgs {
    /// Only show images matching the critical allowlist.
    #[arg(long)]
    critical_only: bool,
}

/// Handles `dockmaint list`.
pub async fn handle_list(global: &GlobalArgs, args: ListArgs) -> Result<()> {
    let (_, pipeline) = build_pipeline(global).await?;
    let records = pipeline.engine().list_images().await?;
    let rows = annotate(&records, pipeline.allowlist(), args.critical_only);

    if rows.is_empty() {
        println!("No images found.");
        return Ok(());
    }
    println!(
        "{:<50} {:<20} {:<14} {:<9} VERSION",
        "REPOSITORY", "TAG", "IMAGE ID", "CRITICAL"
    );
    for row in rows {
        println!(
            "{:<50} {:<20} {:<14} {:<9} {}",
            row.name, row.tag, row.id, row.critical, row.version
        );
    }
    Ok(())
}

struct Row<'a> {
    name: &'a str,
    tag: &'a str,
    id: &'a str,
    critical: &'static str,
    version: String,
}

fn annotate<'a>(
    records: &'a [ImageRecord],
    allowlist: &CriticalAllowlist,
    critical_only: bool,
) -> Vec<Row<'a>> {
    records
        .iter()
        .filter_map(|r| {
            let critical = allowlist.is_critical(&r.name);
            if critical_only && !critical {
                return None;
            }
            let version = if r.is_untagged() {
                "-".to_string()
            } else {
                match ImageVersion::parse(&r.tag) {
                    Ok(v) => v.to_string(),
                    Err(_) => "not a version".to_string(),
                }
            };
            Some(Row {
                name: &r.name,
                tag: &r.tag,
                id: &r.id,
                critical: if critical { "yes" } else { "no" },
                version,
            })
        })
        .collect()
}
