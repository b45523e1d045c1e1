//! Configuration file discovery and loading.
//!
//! Project config lives at `.ens-deploy/config.yml`; an optional
//! `.ens-deploy/config.local.yml` is deep-merged over it.

use crate::config::merger::merge_configs;
use crate::config::schema::DeployConfig;
use crate::error::{DeployError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory holding the project configuration.
pub const CONFIG_DIR: &str = ".ens-deploy";

/// Paths to configuration files in merge order (later overrides earlier).
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project config: .ens-deploy/config.yml
    pub project: Option<PathBuf>,

    /// Local overrides: .ens-deploy/config.local.yml
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        let existing = |name: &str| {
            let path = project_root.join(CONFIG_DIR).join(name);
            path.exists().then_some(path)
        };

        Self {
            project: existing("config.yml"),
            project_local: existing("config.local.yml"),
        }
    }

    /// Returns all existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.project.iter().chain(self.project_local.iter()).collect()
    }

    pub fn has_project_config(&self) -> bool {
        self.project.is_some()
    }
}

/// Expected location of the project config.
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join("config.yml")
}

/// Find the project root by walking up from `start`.
///
/// A directory containing `.ens-deploy/` wins; `.git` is the fallback marker.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(CONFIG_DIR).is_dir() {
            return Some(current);
        }

        if current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DeployError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            DeployError::Io(e)
        }
    })
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<DeployConfig> {
    let content = read_file(path)?;
    parse_config(&content, path)
}

/// Parse YAML content into a [`DeployConfig`].
pub fn parse_config(content: &str, source_path: &Path) -> Result<DeployConfig> {
    // An empty file is a valid config with every default.
    if content.trim().is_empty() {
        return Ok(DeployConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| DeployError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a config file as a raw YAML value, for merging.
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = read_file(path)?;
    if content.trim().is_empty() {
        return Ok(serde_yaml::Value::Mapping(Default::default()));
    }

    serde_yaml::from_str(&content).map_err(|e| DeployError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and merge the project and local config files.
///
/// # Errors
///
/// Returns `ConfigNotFound` if no project config exists.
pub fn load_merged_config(project_root: &Path) -> Result<DeployConfig> {
    let paths = ConfigPaths::discover(project_root);

    if !paths.has_project_config() {
        return Err(DeployError::ConfigNotFound {
            path: project_config_path(project_root),
        });
    }

    let mut configs = Vec::new();
    for path in paths.all_existing() {
        debug!("Loading config from {}", path.display());
        configs.push(load_config_value(path)?);
    }

    let merged = merge_configs(&configs);

    serde_yaml::from_value(merged).map_err(|e| DeployError::ConfigParseError {
        path: project_config_path(project_root),
        message: format!("Failed to parse merged config: {}", e),
    })
}

/// Load config with an optional path override.
///
/// An override is loaded alone, without merging.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<DeployConfig> {
    match config_override {
        Some(path) => load_config_file(path),
        None => load_merged_config(project_root),
    }
}
