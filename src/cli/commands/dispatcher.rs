//! Command dispatching.
//!
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, DeployArgs};
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    ///
    /// Expected failures (no configuration, a failed step) are reported
    /// through the UI and a non-zero [`CommandResult`]; other errors are
    /// returned.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    pub success: bool,

    /// 0 on success, 1 on a failed step, 2 when no configuration was found.
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    config: Option<PathBuf>,
}

impl CommandDispatcher {
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            project_root,
            config: None,
        }
    }

    /// Load this config file instead of discovering one.
    pub fn with_config(mut self, config: Option<PathBuf>) -> Self {
        self.config = config;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Route the CLI subcommand to its implementation and run it.
    ///
    /// No subcommand means `deploy` with default arguments.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let root = &self.project_root;
        let config = self.config.as_deref();

        match &cli.command {
            Some(Commands::Deploy(args)) => {
                super::deploy::DeployCommand::new(root, config, args.clone()).execute(ui)
            }
            Some(Commands::Plan(args)) => {
                super::plan::PlanCommand::new(root, config, args.clone()).execute(ui)
            }
            Some(Commands::Status(args)) => {
                super::status::StatusCommand::new(root, config, args.clone()).execute(ui)
            }
            Some(Commands::Verify(args)) => {
                super::verify::VerifyCommand::new(root, config, args.clone()).execute(ui)
            }
            Some(Commands::Completions(args)) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
            None => {
                super::deploy::DeployCommand::new(root, config, DeployArgs::default()).execute(ui)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn result_codes() {
        assert_eq!(CommandResult::success().exit_code, 0);
        let failure = CommandResult::failure(2);
        assert!(!failure.success);
        assert_eq!(failure.exit_code, 2);
    }

    #[test]
    fn default_command_is_deploy() {
        let temp = TempDir::new().unwrap();
        let cli = Cli::parse_from(["ens-deploy"]);
        let mut ui = MockUI::new();

        let result = CommandDispatcher::new(temp.path().to_path_buf())
            .dispatch(&cli, &mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 2);
        assert!(ui.has_error("No configuration found"));
    }

    #[test]
    fn config_override_is_used() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("deploy.yml");
        fs::write(&config, "settings:\n  default_network: localhost\n").unwrap();
        let cli = Cli::parse_from(["ens-deploy", "status"]);
        let mut ui = MockUI::new();

        let result = CommandDispatcher::new(temp.path().to_path_buf())
            .with_config(Some(config))
            .dispatch(&cli, &mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.has_message("No deployments recorded for localhost"));
    }
}
