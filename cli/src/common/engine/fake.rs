//! In-memory [`ImageEngine`] used by the pass unit tests.
//!
//! It holds an image store that deletions really mutate (so a second run sees
//! the result of the first) and records every command issued.

use super::ImageEngine;
use crate::core::error::{MaintError, Result};
use crate::maintenance::inventory::ImageRecord;
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
struct FakeState {
    images: Vec<ImageRecord>,
    dangling: Vec<String>,
    running: Vec<String>,
    inspect: HashMap<String, Option<Vec<String>>>,
    fail_images: bool,
    fail_running: bool,
    fail_remove: HashSet<String>,
    removed: Vec<String>,
    inspected: Vec<String>,
    prunes: usize,
}

#[derive(Default)]
pub struct FakeEngine {
    state: Mutex<FakeState>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(self, name: &str, tag: &str, id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .images
            .push(ImageRecord::new(name, tag, id));
        self
    }

    pub fn with_dangling(self, id: &str) -> Self {
        self.state.lock().unwrap().dangling.push(id.to_string());
        self
    }

    pub fn with_running(self, reference: &str) -> Self {
        self.state.lock().unwrap().running.push(reference.to_string());
        self
    }

    /// `None` makes inspection of `id` fail.
    pub fn with_inspect(self, id: &str, tags: Option<&[&str]>) -> Self {
        self.state.lock().unwrap().inspect.insert(
            id.to_string(),
            tags.map(|t| t.iter().map(|s| s.to_string()).collect()),
        );
        self
    }

    pub fn failing_image_list(self) -> Self {
        self.state.lock().unwrap().fail_images = true;
        self
    }

    pub fn failing_running_list(self) -> Self {
        self.state.lock().unwrap().fail_running = true;
        self
    }

    pub fn failing_removal(self, reference: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_remove
            .insert(reference.to_string());
        self
    }

    /// Every reference passed to `remove_image`, successful or not.
    pub fn removed(&self) -> Vec<String> {
        self.state.lock().unwrap().removed.clone()
    }

    pub fn inspected(&self) -> Vec<String> {
        self.state.lock().unwrap().inspected.clone()
    }

    pub fn images(&self) -> Vec<ImageRecord> {
        self.state.lock().unwrap().images.clone()
    }

    pub fn prunes(&self) -> usize {
        self.state.lock().unwrap().prunes
    }

    pub fn clear_removed(&self) {
        self.state.lock().unwrap().removed.clear();
    }
}

fn engine_failure(cmd: String, output: &str) -> anyhow::Error {
    anyhow!(MaintError::EngineCommand {
        cmd,
        status: "1".to_string(),
        output: output.to_string(),
    })
}

#[async_trait]
impl ImageEngine for FakeEngine {
    fn describe(&self) -> String {
        "fake".to_string()
    }

    async fn list_images(&self) -> Result<Vec<ImageRecord>> {
        let state = self.state.lock().unwrap();
        if state.fail_images {
            return Err(engine_failure("images".to_string(), "daemon unavailable"));
        }
        Ok(state.images.clone())
    }

    async fn list_dangling(&self) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        if state.fail_images {
            return Err(engine_failure(
                "images -f dangling=true -q".to_string(),
                "daemon unavailable",
            ));
        }
        Ok(state.dangling.clone())
    }

    async fn running_image_refs(&self) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        if state.fail_running {
            return Err(engine_failure("ps".to_string(), "daemon unavailable"));
        }
        Ok(state.running.clone())
    }

    async fn inspect_repo_tags(&self, reference: &str) -> Result<Vec<String>> {
        let mut state = self.state.lock().unwrap();
        state.inspected.push(reference.to_string());
        match state.inspect.get(reference) {
            Some(Some(tags)) => Ok(tags.clone()),
            _ => Err(engine_failure(
                format!("inspect {}", reference),
                "No such object",
            )),
        }
    }

    async fn remove_image(&self, reference: &str, _force: bool) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.removed.push(reference.to_string());
        if state.fail_remove.contains(reference) {
            return Err(engine_failure(
                format!("rmi {}", reference),
                "conflict: unable to remove repository reference",
            ));
        }
        state
            .images
            .retain(|r| r.reference() != reference && r.id != reference);
        state.dangling.retain(|id| id != reference);
        Ok(())
    }

    async fn prune_system(&self) -> Result<String> {
        self.state.lock().unwrap().prunes += 1;
        Ok("Total reclaimed space: 0B".to_string())
    }
}
