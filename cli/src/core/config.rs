//! # dockmaint Configuration System
//!
//! File: cli/src/core/config.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module implements the configuration system for dockmaint, handling
//! loading, path expansion, validation, and access to configuration data.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. An explicit file given with `--config` (or `DOCKMAINT_CONFIG`)
//! 2. User-specific `config.toml` in the platform config directory
//!    (e.g. `~/.config/dockmaint/config.toml` on Linux)
//! 3. Default values defined in the code
//!
//! Command-line flags such as `--engine-bin` are applied on top of the loaded
//! file by `main` before validation.
//!
//! ## Examples
//!
//! ```toml
//! [engine]
//! binary = "podman"
//!
//! [passes]
//! prune = false
//!
//! [critical]
//! extra_patterns = ["registry.internal/platform/"]
//!
//! [usage]
//! on_inspect_failure = "abort-image"
//! ```
//!
use crate::core::error::{MaintError, Result};
use crate::maintenance::usage::InspectFailurePolicy;
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Image name substrings protected from every cleanup pass unless the
/// configuration replaces them.
pub const DEFAULT_CRITICAL_PATTERNS: [&str; 16] = [
    "openshift",
    "redhat",
    "kubernetes",
    "kube-",
    "etcd",
    "gluster",
    "heketi",
    "tiller",
    "coreos/cluster-monitoring-operator",
    "coreos/prometheus-config-reloader",
    "coreos/prometheus-operator",
    "coreos/configmap-reload",
    "weave-",
    "calico",
    "flannel",
    "origin-ansible-service-broker",
];

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)] // Error if unknown fields are in TOML
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub passes: PassesConfig,
    #[serde(default)]
    pub critical: CriticalConfig,
    #[serde(default)]
    pub usage: UsageConfig,
}

/// How dockmaint reaches the container engine.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Engine CLI executable (can use ~). Will be expanded.
    #[serde(default = "default_engine_binary")]
    pub binary: String,
    /// Which backend implementation talks to the engine.
    #[serde(default)]
    pub backend: Backend,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: default_engine_binary(),
            backend: Backend::default(),
        }
    }
}

/// Engine backend selection.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Shell out to the engine's command-line interface.
    #[default]
    Cli,
    /// Talk to the Docker Engine API over its local socket.
    Api,
}

/// Switches for the individual cleanup passes run by `dockmaint run`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PassesConfig {
    #[serde(default = "enabled")]
    pub prune: bool,
    #[serde(default = "enabled")]
    pub dangling: bool,
    #[serde(default = "enabled")]
    pub untagged: bool,
    #[serde(default = "enabled")]
    pub duplicates: bool,
    #[serde(default = "enabled")]
    pub unused: bool,
}

impl Default for PassesConfig {
    fn default() -> Self {
        Self {
            prune: true,
            dangling: true,
            untagged: true,
            duplicates: true,
            unused: true,
        }
    }
}

/// The critical-image allowlist.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct CriticalConfig {
    /// Replaces the built-in pattern list when present.
    pub patterns: Option<Vec<String>>,
    /// Appended to the effective pattern list.
    #[serde(default)]
    pub extra_patterns: Vec<String>,
}

impl CriticalConfig {
    /// The pattern list the critical filter is built from.
    pub fn effective_patterns(&self) -> Vec<String> {
        let mut patterns = match &self.patterns {
            Some(p) => p.clone(),
            None => DEFAULT_CRITICAL_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        };
        patterns.extend(self.extra_patterns.iter().cloned());
        patterns
    }
}

/// Settings for the unused-image pass.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct UsageConfig {
    #[serde(default)]
    pub on_inspect_failure: InspectFailurePolicy,
}

fn default_engine_binary() -> String {
    "docker".to_string()
}
fn enabled() -> bool {
    true
}

/// Loads the configuration, preferring `explicit` over the user config file.
///
/// An explicit path that does not exist is an error; a missing user config
/// file simply means defaults are used. The result is path-expanded but not
/// yet validated, so callers can apply command-line overrides first and then
/// call [`finalize`].
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let config = match explicit {
        Some(path) => {
            let expanded =
                PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
            if !expanded.is_file() {
                return Err(anyhow!(MaintError::Config(format!(
                    "Configuration file '{}' does not exist.",
                    expanded.display()
                ))));
            }
            info!("Loading configuration from: {}", expanded.display());
            load_config_from_path(&expanded)?
        }
        None => load_user_config()?.unwrap_or_default(),
    };
    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

/// Expands paths and validates a configuration after overrides are applied.
pub fn finalize(mut config: Config) -> Result<Config> {
    expand_config_paths(&mut config).context("Failed to expand paths in configuration")?;
    validate_config(&config).context("Configuration validation failed")?;
    debug!("Final configuration: {:?}", config);
    Ok(config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "dockmaint", "dockmaint") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    config.engine.binary = shellexpand::tilde(&config.engine.binary).into_owned();
    debug!("Expanded engine binary: {}", config.engine.binary);
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    info!("Validating final configuration...");
    if config.engine.binary.trim().is_empty() {
        return Err(anyhow!(MaintError::Config(
            "Engine binary cannot be empty.".to_string()
        )));
    }
    let patterns = config.critical.effective_patterns();
    if patterns.iter().any(|p| p.is_empty()) {
        // An empty substring would match every image and silently disable cleanup.
        return Err(anyhow!(MaintError::Config(
            "Critical image patterns cannot be empty strings.".to_string()
        )));
    }
    if patterns.is_empty() {
        warn!("Critical image allowlist is empty; no image is protected from cleanup.");
    }
    let p = &config.passes;
    if !(p.prune || p.dangling || p.untagged || p.duplicates || p.unused) {
        warn!("Every cleanup pass is disabled; `dockmaint run` will do nothing.");
    }
    info!("Configuration validation successful.");
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_deserialize_basic_toml() {
        let toml_content = r#"
            [engine]
            binary = "podman"

            [passes]
            prune = false

            [critical]
            extra_patterns = ["internal/platform"]

            [usage]
            on_inspect_failure = "abort-image"
        "#;

        let config: Config = toml::from_str(toml_content).expect("Failed to parse TOML");

        assert_eq!(config.engine.binary, "podman");
        assert_eq!(config.engine.backend, Backend::Cli); // Default
        assert!(!config.passes.prune);
        assert!(config.passes.unused); // Default
        assert_eq!(
            config.usage.on_inspect_failure,
            InspectFailurePolicy::AbortImage
        );
        let patterns = config.critical.effective_patterns();
        assert_eq!(patterns.len(), DEFAULT_CRITICAL_PATTERNS.len() + 1);
        assert_eq!(patterns.last().map(String::as_str), Some("internal/platform"));
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").expect("Failed to parse TOML");
        assert_eq!(config.engine.binary, "docker");
        assert_eq!(config.passes, PassesConfig::default());
        assert_eq!(
            config.usage.on_inspect_failure,
            InspectFailurePolicy::SkipReference
        );
        assert_eq!(config.critical.effective_patterns().len(), 16);
    }

    #[test]
    fn test_patterns_replace_defaults() {
        let config: Config = toml::from_str(
            r#"
            [critical]
            patterns = ["mycorp/"]
            "#,
        )
        .unwrap();
        assert_eq!(config.critical.effective_patterns(), vec!["mycorp/"]);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str(
            r#"
            [engine]
            binray = "docker"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_api_backend_deserializes() {
        let config: Config = toml::from_str("[engine]\nbackend = \"api\"\n").unwrap();
        assert_eq!(config.engine.backend, Backend::Api);
    }

    #[test]
    fn test_path_expansion() {
        let mut config = Config {
            engine: EngineConfig {
                binary: "~/bin/docker".to_string(),
                backend: Backend::Cli,
            },
            ..Default::default()
        };

        expand_config_paths(&mut config).unwrap();

        let home_dir = dirs::home_dir().unwrap();
        assert_eq!(
            config.engine.binary,
            home_dir.join("bin/docker").to_string_lossy()
        );
    }

    #[test]
    fn test_validate_config_empty_pattern() {
        let config = Config {
            critical: CriticalConfig {
                patterns: None,
                extra_patterns: vec![String::new()],
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("cannot be empty strings"));
    }

    #[test]
    fn test_validate_config_empty_binary() {
        let config = Config {
            engine: EngineConfig {
                binary: "  ".to_string(),
                backend: Backend::Cli,
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_explicit_config() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("maint.toml");
        fs::write(&path, "[engine]\nbinary = \"/usr/local/bin/docker\"\n").unwrap();

        let config = finalize(load_config(Some(&path)).unwrap()).unwrap();
        assert_eq!(config.engine.binary, "/usr/local/bin/docker");
    }

    #[test]
    fn test_load_missing_explicit_config() {
        let temp_dir = tempdir().unwrap();
        let result = load_config(Some(&temp_dir.path().join("absent.toml")));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }
}
