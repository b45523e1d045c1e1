//! Plan command implementation.
//!
//! `ens-deploy plan` prints the resolved step order and what a deploy would
//! do with each step. Nothing is sent and nothing is written.

use std::path::{Path, PathBuf};

use crate::cli::args::PlanArgs;
use crate::error::Result;
use crate::runner::{PipelineRunner, PlanAction, RunOptions};
use crate::steps::ens_steps;
use crate::ui::{should_use_colors, DeployTheme, StatusKind, Table, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::project::Project;

/// The plan command implementation.
pub struct PlanCommand {
    project_root: PathBuf,
    config: Option<PathBuf>,
    args: PlanArgs,
}

impl PlanCommand {
    pub fn new(project_root: &Path, config: Option<&Path>, args: PlanArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config: config.map(Path::to_path_buf),
            args,
        }
    }
}

impl Command for PlanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(project) = Project::open(&self.project_root, self.config.as_deref(), ui)? else {
            return Ok(CommandResult::failure(2));
        };

        let network = project.network_name(self.args.network.as_deref());
        let context = project.run_context(&network)?;
        let record = project.load_record(&context, false)?;

        let steps = ens_steps();
        let options = RunOptions {
            only: self.args.tags.clone(),
            force: self.args.force.clone(),
            ..Default::default()
        };
        let planned = PipelineRunner::new(&steps).plan(&context, &record, &options)?;

        let theme = if should_use_colors() && ui.is_interactive() {
            DeployTheme::new()
        } else {
            DeployTheme::plain()
        };

        ui.show_header(&format!("Plan for {} (chain {})", network, context.network.chain_id));

        let mut table = Table::new(&["", "#", "Step", "Action", "Tags"]);
        for (i, step) in planned.iter().enumerate() {
            table.add_row([
                StatusKind::from(&step.action).styled(&theme),
                (i + 1).to_string(),
                step.id.clone(),
                step.action.to_string(),
                theme.dim.apply_to(step.tags.join(", ")).to_string(),
            ]);
        }
        ui.message(&table.render());

        let pending = planned
            .iter()
            .filter(|s| matches!(s.action, PlanAction::Run | PlanAction::Redeploy))
            .count();
        ui.message("");
        if pending == 0 {
            ui.success(&format!("{} is up to date", network));
        } else {
            ui.message(&format!("{} of {} steps would run", pending, planned.len()));
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn project(config: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".ens-deploy");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.yml"), config).unwrap();
        temp
    }

    #[test]
    fn plans_every_step_in_order() {
        let temp = project("settings:\n  default_network: localhost\n");
        let mut ui = MockUI::new();
        let result = PlanCommand::new(temp.path(), None, PlanArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        let table = &ui.messages()[0];
        let registry = table.find("registry").unwrap();
        let root = table.find(" root ").unwrap();
        assert!(registry < root);
        assert!(ui.has_message("steps would run"));
    }

    #[test]
    fn untagged_network_plans_skips() {
        let temp = project(
            "networks:\n  plain:\n    chain_id: 7\n    rpc_url: http://127.0.0.1:8545\nsettings:\n  default_network: plain\n",
        );
        let mut ui = MockUI::new();
        PlanCommand::new(
            temp.path(),
            None,
            PlanArgs {
                tags: vec!["root".to_string()],
                ..Default::default()
            },
        )
        .execute(&mut ui)
        .unwrap();

        assert!(ui.has_message("skip (network 'plain' is not tagged use_root)"));
    }

    #[test]
    fn force_plans_redeploy() {
        let temp = project("{}\n");
        let mut ui = MockUI::new();
        PlanCommand::new(
            temp.path(),
            None,
            PlanArgs {
                tags: vec!["registry".to_string()],
                force: vec!["registry".to_string()],
                ..Default::default()
            },
        )
        .execute(&mut ui)
        .unwrap();

        assert!(ui.has_message("redeploy"));
        assert!(ui.has_message("1 of 1 steps would run"));
    }
}
