//! Configuration, network and record loading shared by the commands.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::backend::{CommandBackend, CommandVerifier};
use crate::config::{load_config, validate, DeployConfig, InterpolationContext};
use crate::environment::RunContext;
use crate::error::{DeployError, Result};
use crate::state::DeploymentRecord;
use crate::ui::UserInterface;

/// A loaded and validated project.
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    config: DeployConfig,
}

impl Project {
    /// Load and validate the configuration.
    ///
    /// Prints an error and returns `None` when no configuration exists.
    pub fn open(
        root: &Path,
        config_override: Option<&Path>,
        ui: &mut dyn UserInterface,
    ) -> Result<Option<Self>> {
        let config = match load_config(root, config_override) {
            Ok(config) => config,
            Err(DeployError::ConfigNotFound { path }) => {
                ui.error(&format!("No configuration found at {}", path.display()));
                ui.show_hint("Create .ens-deploy/config.yml or pass --config <file>");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        validate(&config)?;

        Ok(Some(Self {
            root: root.to_path_buf(),
            config,
        }))
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The requested network, or `settings.default_network`.
    pub fn network_name(&self, requested: Option<&str>) -> String {
        requested
            .map(String::from)
            .unwrap_or_else(|| self.config.settings.default_network.clone())
    }

    /// Resolve network, accounts and variables for a run.
    pub fn run_context(&self, network: &str) -> Result<RunContext> {
        RunContext::from_config(&self.config, network, &self.root)
    }

    pub fn record_path(&self, network: &str) -> PathBuf {
        DeploymentRecord::path_for(&self.root.join(&self.config.settings.deployments_dir), network)
    }

    /// Load the network's record.
    ///
    /// The record is detached from disk when `persist` is false or the
    /// network does not save deployments.
    pub fn load_record(&self, context: &RunContext, persist: bool) -> Result<DeploymentRecord> {
        let network = &context.network;
        let path = self.record_path(&network.name);
        let record = DeploymentRecord::load(&path, &network.name, network.chain_id)?;

        if persist && network.save_deployments {
            Ok(record)
        } else {
            debug!("Deployment record for {} will not be saved", network.name);
            Ok(record.detached())
        }
    }

    fn interpolation(&self, context: &RunContext) -> InterpolationContext {
        InterpolationContext::new()
            .with_network(&context.network.name, context.network.chain_id)
            .with_env(context.vars.clone())
    }

    fn workdir(&self) -> PathBuf {
        match &self.config.backend.workdir {
            Some(dir) => self.root.join(dir),
            None => self.root.clone(),
        }
    }

    /// The subprocess backend, with account keys masked in its output.
    pub fn backend(&self, context: &RunContext) -> CommandBackend {
        CommandBackend::new(self.config.backend.clone(), self.interpolation(context))
            .with_workdir(self.workdir())
            .with_redacted(context.accounts.secrets())
    }

    pub fn verifier(&self, context: &RunContext) -> CommandVerifier {
        CommandVerifier::new(&self.config.backend, self.interpolation(context))
            .with_workdir(self.workdir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn project(config: &str) -> (TempDir, Project) {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".ens-deploy");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.yml"), config).unwrap();
        let mut ui = MockUI::new();
        let project = Project::open(temp.path(), None, &mut ui).unwrap().unwrap();
        (temp, project)
    }

    #[test]
    fn missing_config_reports_and_returns_none() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        let project = Project::open(temp.path(), None, &mut ui).unwrap();
        assert!(project.is_none());
        assert!(ui.has_error("No configuration found"));
        assert!(ui.has_hint("--config"));
    }

    #[test]
    fn network_defaults_to_settings() {
        let (_temp, project) = project("settings:\n  default_network: blast\n");
        assert_eq!(project.network_name(None), "blast");
        assert_eq!(project.network_name(Some("sepolia")), "sepolia");
    }

    #[test]
    fn record_path_is_under_deployments_dir() {
        let (temp, project) = project("settings:\n  deployments_dir: out\n");
        assert_eq!(
            project.record_path("blast"),
            temp.path().join("out").join("blast.json")
        );
    }

    #[test]
    fn non_persisting_record_is_detached() {
        let (_temp, project) = project("{}\n");
        let context = project.run_context("localhost").unwrap();

        let record = project.load_record(&context, false).unwrap();
        assert!(record.path().is_none());
    }
}
