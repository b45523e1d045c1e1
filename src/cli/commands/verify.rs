//! Verify command implementation.
//!
//! `ens-deploy verify` re-submits recorded contracts to the network's block
//! explorer, for retrying verifications that failed during a deploy.

use std::path::{Path, PathBuf};

use crate::backend::{verify_recorded, VerifyOutcome};
use crate::cli::args::VerifyArgs;
use crate::error::Result;
use crate::steps::catalog::LEGACY_RESOLVER_ARTIFACT;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::project::Project;

/// The verify command implementation.
pub struct VerifyCommand {
    project_root: PathBuf,
    config: Option<PathBuf>,
    args: VerifyArgs,
}

impl VerifyCommand {
    pub fn new(project_root: &Path, config: Option<&Path>, args: VerifyArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config: config.map(Path::to_path_buf),
            args,
        }
    }
}

impl Command for VerifyCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(project) = Project::open(&self.project_root, self.config.as_deref(), ui)? else {
            return Ok(CommandResult::failure(2));
        };

        let network = project.network_name(self.args.network.as_deref());
        let context = project.run_context(&network)?;
        let record = project.load_record(&context, false)?;

        if context.network.explorer.is_none() {
            ui.warning(&format!("Network '{}' has no block explorer configured", network));
            return Ok(CommandResult::success());
        }

        // The pinned legacy resolver build cannot be verified from source.
        let contracts: Vec<String> = if self.args.contracts.is_empty() {
            record
                .deployments
                .iter()
                .filter(|(_, entry)| entry.artifact != LEGACY_RESOLVER_ARTIFACT)
                .map(|(name, _)| name.clone())
                .collect()
        } else {
            self.args.contracts.clone()
        };

        if contracts.is_empty() {
            ui.message(&format!("No deployments recorded for {}", network));
            return Ok(CommandResult::success());
        }

        ui.show_header(&format!("Verifying {} contracts on {}", contracts.len(), network));

        let mut verifier = project.verifier(&context);
        let mut failed = 0;
        for outcome in verify_recorded(&mut verifier, &context.network, &record, &contracts) {
            match &outcome {
                VerifyOutcome::Verified { .. } => ui.success(&outcome.to_string()),
                VerifyOutcome::Skipped { .. } => ui.message(&outcome.to_string()),
                VerifyOutcome::Failed(_) => {
                    failed += 1;
                    ui.warning(&outcome.to_string());
                }
            }
        }

        if failed > 0 {
            ui.error(&format!("{} of {} verifications failed", failed, contracts.len()));
            return Ok(CommandResult::failure(1));
        }
        Ok(CommandResult::success())
    }
}
