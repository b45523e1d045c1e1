//! Status command implementation.
//!
//! `ens-deploy status` lists the recorded deployments for a network.

use std::path::{Path, PathBuf};

use crate::cli::args::StatusArgs;
use crate::error::Result;
use crate::steps::ens_steps;
use crate::ui::{
    format_relative_time, should_use_colors, DeployTheme, StatusKind, Table, UserInterface,
};

use super::dispatcher::{Command, CommandResult};
use super::project::Project;

/// The status command implementation.
pub struct StatusCommand {
    project_root: PathBuf,
    config: Option<PathBuf>,
    args: StatusArgs,
}

impl StatusCommand {
    pub fn new(project_root: &Path, config: Option<&Path>, args: StatusArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config: config.map(Path::to_path_buf),
            args,
        }
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(project) = Project::open(&self.project_root, self.config.as_deref(), ui)? else {
            return Ok(CommandResult::failure(2));
        };

        let network = project.network_name(self.args.network.as_deref());
        let context = project.run_context(&network)?;
        let record = project.load_record(&context, false)?;

        if self.args.json {
            ui.message(&serde_json::to_string_pretty(&record)?);
            return Ok(CommandResult::success());
        }

        ui.show_header(&format!("{} (chain {})", network, record.chain_id));

        if record.is_empty() {
            ui.message(&format!("No deployments recorded for {}", network));
            ui.show_hint(&format!("Run: ens-deploy deploy --network {}", network));
            return Ok(CommandResult::success());
        }

        let theme = if should_use_colors() && ui.is_interactive() {
            DeployTheme::new()
        } else {
            DeployTheme::plain()
        };

        let mut contracts = Table::new(&["Contract", "Address", "Deployed"]);
        for (name, entry) in &record.deployments {
            contracts.add_row([
                name.clone(),
                theme.address.apply_to(entry.address.as_str()).to_string(),
                format_relative_time(entry.deployed_at),
            ]);
        }
        ui.message(&contracts.render());
        ui.message("");

        let mut steps = Table::new(&["", "Step", "Completed"]);
        for step in ens_steps() {
            let (kind, when) = match record.step(&step.id) {
                Some(done) => (StatusKind::Success, format_relative_time(done.completed_at)),
                None => (StatusKind::Pending, "never".to_string()),
            };
            steps.add_row([kind.styled(&theme), step.id, when]);
        }
        ui.message(&steps.render());

        Ok(CommandResult::success())
    }
}
