//! Deploy command implementation.
//!
//! `ens-deploy deploy` runs the ENS step catalog against a network.

use std::path::{Path, PathBuf};

use crate::backend::{DeployBackend, SimulatedBackend, SimulatedVerifier, Verifier};
use crate::cli::args::DeployArgs;
use crate::error::Result;
use crate::runner::{PipelineRunner, RunOptions, RunProgress, StepReport};
use crate::steps::{ens_steps, StepStatus};
use crate::ui::{RunSummary, SpinnerHandle, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::project::Project;

/// The deploy command implementation.
pub struct DeployCommand {
    project_root: PathBuf,
    config: Option<PathBuf>,
    args: DeployArgs,
}

impl DeployCommand {
    pub fn new(project_root: &Path, config: Option<&Path>, args: DeployArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config: config.map(Path::to_path_buf),
            args,
        }
    }

    fn options(&self) -> RunOptions {
        RunOptions {
            only: self.args.tags.clone(),
            force: self.args.force.clone(),
            verify: !self.args.no_verify,
        }
    }
}

/// One line per finished step, e.g. `registry: deployed ENSRegistry at 0x..`.
fn step_line(report: &StepReport) -> String {
    match report.status {
        StepStatus::Skipped if report.satisfied => format!("{}: up to date", report.id),
        StepStatus::Skipped => format!(
            "{}: skipped ({})",
            report.id,
            report.reason.as_deref().unwrap_or("precondition")
        ),
        StepStatus::Failed => format!(
            "{}: {}",
            report.id,
            report.error.as_deref().unwrap_or("failed")
        ),
        _ => {
            let deployed: Vec<String> = report
                .newly_deployed()
                .map(|d| format!("{} at {}", d.name, d.result.address))
                .collect();
            if deployed.is_empty() {
                format!("{}: up to date", report.id)
            } else {
                format!("{}: deployed {}", report.id, deployed.join(", "))
            }
        }
    }
}

impl Command for DeployCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(project) = Project::open(&self.project_root, self.config.as_deref(), ui)? else {
            return Ok(CommandResult::failure(2));
        };

        let network = project.network_name(self.args.network.as_deref());
        let mut context = project.run_context(&network)?;
        let dry_run = self.args.dry_run;

        let (mut backend, mut verifier): (Box<dyn DeployBackend>, Box<dyn Verifier>) = if dry_run
        {
            context.accounts = context.accounts.clone().with_placeholders();
            (
                Box::new(SimulatedBackend::new()),
                Box::new(SimulatedVerifier::new()),
            )
        } else {
            (
                Box::new(project.backend(&context)),
                Box::new(project.verifier(&context)),
            )
        };
        let mut record = project.load_record(&context, !dry_run)?;

        let steps = ens_steps();
        let runner = PipelineRunner::new(&steps);
        let options = self.options();
        let order = runner.order(&options)?;

        ui.show_run_header(&network, order.len(), dry_run);

        let details = ui.output_mode().shows_details();
        let mut spinner: Option<Box<dyn SpinnerHandle>> = None;
        let result = runner.run_with_progress(
            &mut context,
            &mut record,
            backend.as_mut(),
            verifier.as_mut(),
            &options,
            |event| match event {
                RunProgress::StepStarting { id, index, total } => {
                    spinner = Some(ui.start_spinner(&format!("[{}/{}] {}", index + 1, total, id)));
                }
                RunProgress::StepFinished { report } => {
                    let line = step_line(report);
                    if let Some(mut s) = spinner.take() {
                        match report.status {
                            StepStatus::Deployed => s.finish_success(&line),
                            StepStatus::Skipped if report.satisfied => s.finish_success(&line),
                            StepStatus::Skipped => s.finish_skipped(&line),
                            _ => s.finish_error(&line),
                        }
                    }
                    if details {
                        for call in &report.wiring {
                            ui.message(&format!("    → {}", call));
                        }
                        for outcome in &report.verifications {
                            ui.message(&format!("    {}", outcome));
                        }
                    }
                }
            },
        )?;

        ui.show_run_summary(&RunSummary::from(&result));

        let verification_failures: Vec<String> = result
            .verification_failures()
            .map(|outcome| outcome.to_string())
            .collect();
        for failure in &verification_failures {
            ui.warning(failure);
        }
        if !verification_failures.is_empty() {
            ui.show_hint(&format!(
                "Retry with: ens-deploy verify --network {}",
                network
            ));
        }

        if let Some(failure) = &result.failure {
            ui.error(&failure.to_string());
            return Ok(CommandResult::failure(1));
        }

        if dry_run {
            ui.success(&format!("Dry run on {} complete, nothing was saved", network));
        } else {
            ui.success(&format!("Deployed to {}", network));
            if let Some(path) = record.path() {
                ui.message(&format!("Record: {}", path.display()));
            }
        }
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DeploymentRecord;
    use crate::ui::{MockUI, SpinnerStatus};
    use std::fs;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
settings:
  default_network: devnet
  env:
    BATCH_GATEWAY_URLS: '["https://gateway.example/rpc"]'
    DNSSEC_ANCHORS: "0x00002b000100000e1000244a5c080249aac11d7b6f6446702e54a1607371607a1a41855200fd2ce1cdde32f24e8fb500002b000100000e1000244f660802e06d44b80b8f1d39a95c0b0d7c65d08458e880409bbc683457104237c7f8ec8d"
    OFFCHAIN_DNS_GATEWAY: "https://dns.example/lookup"
networks:
  devnet:
    chain_id: 1337
    rpc_url: http://127.0.0.1:8545
    tags: [use_root]
    save_deployments: true
"#;

    fn project() -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".ens-deploy");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.yml"), CONFIG).unwrap();
        temp
    }

    fn dry_run(temp: &TempDir, args: DeployArgs) -> (CommandResult, MockUI) {
        let mut ui = MockUI::new();
        let command = DeployCommand::new(
            temp.path(),
            None,
            DeployArgs {
                dry_run: true,
                ..args
            },
        );
        let result = command.execute(&mut ui).unwrap();
        (result, ui)
    }

    #[test]
    fn dry_run_deploys_catalog_without_saving() {
        let temp = project();
        let (result, ui) = dry_run(&temp, DeployArgs::default());

        assert!(result.success);
        assert!(ui.has_success("Dry run on devnet"));
        assert_eq!(ui.run_headers()[0].0, "devnet");
        assert!(ui.run_headers()[0].2);
        assert!(!temp.path().join("deployments").join("devnet.json").exists());

        let summary = &ui.summaries()[0];
        assert!(summary.success);
        assert!(summary.contracts_deployed > 0);
        assert!(ui
            .finished_spinners()
            .iter()
            .any(|(status, line)| *status == SpinnerStatus::Skipped
                && line.starts_with("legacy-resolver")));
    }

    #[test]
    fn tags_limit_the_run() {
        let temp = project();
        let (result, ui) = dry_run(
            &temp,
            DeployArgs {
                tags: vec!["registry".to_string()],
                ..Default::default()
            },
        );

        assert!(result.success);
        assert_eq!(ui.run_headers()[0].1, 1);
        assert_eq!(ui.spinners(), ["[1/1] registry"]);
    }

    #[test]
    fn dry_run_reports_recorded_steps_as_up_to_date() {
        let temp = project();
        let mut record = DeploymentRecord::new("devnet", 1337);
        record.insert(
            "ENSRegistry",
            crate::state::DeploymentEntry {
                address: crate::types::Address::zero(),
                transaction_hash: None,
                args: Vec::new(),
                artifact: "ENSRegistry".to_string(),
                deployed_at: chrono::Utc::now(),
            },
        );
        record.mark_step_complete("registry", Vec::new());
        let path = temp.path().join("deployments").join("devnet.json");
        record.with_path(&path).save().unwrap();

        let (result, ui) = dry_run(
            &temp,
            DeployArgs {
                tags: vec!["registry".to_string()],
                ..Default::default()
            },
        );
        assert!(result.success);
        assert_eq!(ui.summaries()[0].contracts_deployed, 0);
        assert!(ui
            .finished_spinners()
            .iter()
            .any(|(_, line)| line == "registry: up to date"));
    }

    #[test]
    fn missing_setting_fails_with_exit_one() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".ens-deploy");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("config.yml"),
            "networks:\n  devnet:\n    chain_id: 1337\n    rpc_url: http://127.0.0.1:8545\n    tags: [use_root]\nsettings:\n  default_network: devnet\n",
        )
        .unwrap();

        let (result, ui) = dry_run(
            &temp,
            DeployArgs {
                tags: vec!["dnssec-oracle".to_string()],
                ..Default::default()
            },
        );
        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("dnssec-oracle"));
    }

    #[test]
    fn no_config_exits_two() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        let result = DeployCommand::new(temp.path(), None, DeployArgs::default())
            .execute(&mut ui)
            .unwrap();
        assert_eq!(result.exit_code, 2);
    }
}
