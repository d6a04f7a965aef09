//! # dockmaint Maintenance Pipeline (`maintenance`)
//!
//! File: cli/src/maintenance/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The image-store cleanup itself. A run is a fixed sequence of passes, each
//! fetching a fresh inventory from the engine:
//!
//! 1. `prune`: engine system prune
//! 2. `dangling`: remove dangling images
//! 3. `untagged`: remove `<none>` images
//! 4. `duplicates`: keep only the newest version tag per image name
//! 5. `unused`: remove images no running container uses
//!
//! ## Architecture
//!
//! - **`inventory`**: tokenizers turning engine text output into typed records.
//! - **`critical`**: the allowlist consulted by every pass.
//! - **`version`**: tag version parsing and ordering.
//! - **`cleanup`**, **`duplicates`**, **`usage`**: the passes.
//! - **`executor`**: issues deletions, prints `[OK]`/`[ERROR]` lines.
//! - **`report`**: per-pass and per-run outcomes.
//!
//! A pass returns `Err` only for fatal conditions (an inventory listing
//! failed). [`Pipeline::run`] stops at the first such error so no further
//! deletions are issued.
//!
pub mod cleanup;
pub mod critical;
pub mod duplicates;
pub mod executor;
pub mod inventory;
pub mod report;
pub mod usage;
pub mod version;

use crate::common::engine::ImageEngine;
use crate::core::config::PassesConfig;
use crate::core::error::Result;
use critical::CriticalAllowlist;
use executor::Executor;
use report::{Pass, PassReport, RunSummary};
use tracing::info;
use usage::InspectFailurePolicy;

/// Everything a run needs: the engine and the policies applied to it.
pub struct Pipeline {
    engine: Box<dyn ImageEngine>,
    allowlist: CriticalAllowlist,
    policy: InspectFailurePolicy,
    dry_run: bool,
}

impl Pipeline {
    pub fn new(
        engine: Box<dyn ImageEngine>,
        allowlist: CriticalAllowlist,
        policy: InspectFailurePolicy,
        dry_run: bool,
    ) -> Self {
        Self {
            engine,
            allowlist,
            policy,
            dry_run,
        }
    }

    pub fn engine(&self) -> &dyn ImageEngine {
        self.engine.as_ref()
    }

    pub fn allowlist(&self) -> &CriticalAllowlist {
        &self.allowlist
    }

    /// Runs a single pass.
    pub async fn run_pass(&self, pass: Pass) -> Result<PassReport> {
        let engine = self.engine.as_ref();
        let executor = Executor::new(engine, self.dry_run);
        match pass {
            Pass::Prune => cleanup::prune_images(engine, &executor).await,
            Pass::Dangling => cleanup::clean_dangling_images(engine, &executor).await,
            Pass::Untagged => {
                cleanup::clean_untagged_images(engine, &self.allowlist, &executor).await
            }
            Pass::Duplicates => {
                duplicates::clean_duplicate_images(engine, &self.allowlist, &executor).await
            }
            Pass::Unused => {
                usage::clean_unused_images(engine, &self.allowlist, self.policy, &executor).await
            }
        }
    }

    /// Runs `passes` in order, stopping at the first fatal error.
    pub async fn run(&self, passes: &[Pass]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for pass in passes {
            let report = self.run_pass(*pass).await?;
            info!("{}", report.summary_line());
            summary.reports.push(report);
        }
        Ok(summary)
    }
}

/// The passes switched on in configuration, in pipeline order.
pub fn enabled_passes(config: &PassesConfig) -> Vec<Pass> {
    Pass::ALL
        .into_iter()
        .filter(|pass| match pass {
            Pass::Prune => config.prune,
            Pass::Dangling => config.dangling,
            Pass::Untagged => config.untagged,
            Pass::Duplicates => config.duplicates,
            Pass::Unused => config.unused,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::engine::fake::FakeEngine;
    use std::sync::Arc;

    /// Lets a test keep a handle on the engine the pipeline owns.
    struct Shared(Arc<FakeEngine>);

    #[async_trait::async_trait]
    impl ImageEngine for Shared {
        fn describe(&self) -> String {
            self.0.describe()
        }
        async fn list_images(&self) -> Result<Vec<inventory::ImageRecord>> {
            self.0.list_images().await
        }
        async fn list_dangling(&self) -> Result<Vec<String>> {
            self.0.list_dangling().await
        }
        async fn running_image_refs(&self) -> Result<Vec<String>> {
            self.0.running_image_refs().await
        }
        async fn inspect_repo_tags(&self, reference: &str) -> Result<Vec<String>> {
            self.0.inspect_repo_tags(reference).await
        }
        async fn remove_image(&self, reference: &str, force: bool) -> Result<()> {
            self.0.remove_image(reference, force).await
        }
        async fn prune_system(&self) -> Result<String> {
            self.0.prune_system().await
        }
    }

    fn pipeline(engine: &Arc<FakeEngine>) -> Pipeline {
        Pipeline::new(
            Box::new(Shared(Arc::clone(engine))),
            CriticalAllowlist::default(),
            InspectFailurePolicy::default(),
            false,
        )
    }

    fn busy_host() -> FakeEngine {
        FakeEngine::new()
            .with_dangling("999999999999")
            .with_image("<none>", "<none>", "5f1a2c3d4e5f")
            .with_image("myapp", "1.0.0", "aaaaaaaaaaaa")
            .with_image("myapp", "v1.2.0", "bbbbbbbbbbbb")
            .with_image("myapp", "1.1.0", "cccccccccccc")
            .with_image("redis", "7.2", "dddddddddddd")
            .with_image("quay.io/openshift/origin-node", "v3.11", "eeeeeeeeeeee")
            .with_image("quay.io/openshift/origin-node", "v3.10", "ffffffffffff")
            .with_image("docker.io/calico/node", "<none>", "101010101010")
            .with_running("myapp:v1.2.0")
    }

    #[tokio::test]
    async fn test_full_run() {
        let engine = Arc::new(busy_host());
        let summary = pipeline(&engine).run(&Pass::ALL).await.unwrap();

        assert_eq!(engine.prunes(), 1);
        assert_eq!(
            engine.removed(),
            vec![
                "999999999999",
                "5f1a2c3d4e5f",
                "myapp:1.0.0",
                "myapp:1.1.0",
                "redis:7.2"
            ]
        );
        assert_eq!(summary.reports.len(), 5);
        assert_eq!(summary.total_deleted(), 5);
    }

    #[tokio::test]
    async fn test_critical_images_never_deleted() {
        let engine = Arc::new(busy_host());
        pipeline(&engine).run(&Pass::ALL).await.unwrap();

        let allowlist = CriticalAllowlist::default();
        let critical_ids = ["eeeeeeeeeeee", "ffffffffffff", "101010101010"];
        for reference in engine.removed() {
            assert!(!allowlist.is_critical(&reference), "deleted {}", reference);
            assert!(!critical_ids.contains(&reference.as_str()));
        }
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let engine = Arc::new(busy_host());
        let p = pipeline(&engine);
        p.run(&Pass::ALL).await.unwrap();
        engine.clear_removed();

        let summary = p.run(&Pass::ALL).await.unwrap();
        assert!(engine.removed().is_empty());
        assert_eq!(summary.total_deleted(), 0);
    }

    #[tokio::test]
    async fn test_listing_failure_stops_run() {
        let engine = Arc::new(busy_host().failing_image_list());
        let result = pipeline(&engine).run(&Pass::ALL).await;
        assert!(result.is_err());
        assert!(engine.removed().is_empty());
    }

    #[test]
    fn test_enabled_passes() {
        let config = PassesConfig {
            prune: false,
            duplicates: false,
            ..PassesConfig::default()
        };
        assert_eq!(
            enabled_passes(&config),
            vec![Pass::Dangling, Pass::Untagged, Pass::Unused]
        );
        assert_eq!(enabled_passes(&PassesConfig::default()), Pass::ALL.to_vec());
    }
}
