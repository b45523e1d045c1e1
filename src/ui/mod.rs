//! Terminal output for deploy runs.
//!
//! - [`UserInterface`] abstracts every line the CLI prints
//! - [`TerminalUI`] draws with colors and spinners on a TTY
//! - [`NonInteractiveUI`] prints plain lines for CI logs
//! - [`MockUI`] captures output in tests
//!
//! # Example
//!
//! ```
//! use ens_deploy::ui::{create_ui, OutputMode};
//!
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.show_header("blast");
//! ui.success("Deployment complete");
//! ```

pub mod icons;
pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod progress;
pub mod spinner;
pub mod table;
pub mod terminal;
pub mod theme;

pub use icons::StatusKind;
pub use mock::{MockSpinner, MockUI, SpinnerStatus};
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use progress::{format_duration, format_relative_time};
pub use spinner::ProgressSpinner;
pub use table::Table;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, DeployTheme};

use std::time::Duration;

use crate::runner::PipelineResult;
use crate::steps::StepStatus;

/// Everything the CLI shows the user goes through this trait.
pub trait UserInterface {
    fn output_mode(&self) -> OutputMode;

    fn message(&mut self, msg: &str);

    fn success(&mut self, msg: &str);

    fn warning(&mut self, msg: &str);

    /// Errors print in every output mode.
    fn error(&mut self, msg: &str);

    /// Start a spinner for an operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    fn show_header(&mut self, title: &str);

    /// Show progress (e.g., "[3/12]").
    fn show_progress(&mut self, current: usize, total: usize);

    /// Show a follow-up suggestion.
    fn show_hint(&mut self, hint: &str);

    /// Banner printed before the first step runs.
    fn show_run_header(&mut self, network: &str, step_count: usize, dry_run: bool);

    /// Table of step outcomes printed after a run.
    fn show_run_summary(&mut self, summary: &RunSummary);

    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    fn set_message(&mut self, msg: &str);

    fn finish_success(&mut self, msg: &str);

    fn finish_error(&mut self, msg: &str);

    fn finish_skipped(&mut self, msg: &str);
}

/// One row of a [`RunSummary`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepSummary {
    pub name: String,
    pub status: StatusKind,
    /// Deployed contracts, skip reason or error.
    pub detail: Option<String>,
    pub duration: Option<Duration>,
}

/// Outcome of a run, flattened for display.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub network: String,
    pub step_results: Vec<StepSummary>,
    pub total_duration: Duration,
    pub steps_deployed: usize,
    pub steps_skipped: usize,
    pub contracts_deployed: usize,
    pub verification_failures: usize,
    pub failed_step: Option<String>,
    pub success: bool,
}

impl From<&PipelineResult> for RunSummary {
    fn from(result: &PipelineResult) -> Self {
        let mut step_results: Vec<StepSummary> = result
            .steps
            .iter()
            .map(|report| {
                let detail = match report.status {
                    StepStatus::Skipped if report.satisfied => Some("up to date".to_string()),
                    StepStatus::Skipped => report.reason.clone(),
                    StepStatus::Failed => report.error.clone(),
                    _ => {
                        let names: Vec<&str> =
                            report.newly_deployed().map(|d| d.name.as_str()).collect();
                        if names.is_empty() {
                            Some("up to date".to_string())
                        } else {
                            Some(format!("deployed {}", names.join(", ")))
                        }
                    }
                };
                StepSummary {
                    name: report.id.clone(),
                    status: if report.satisfied {
                        StatusKind::Success
                    } else {
                        report.status.into()
                    },
                    detail,
                    duration: (report.status != StepStatus::Skipped).then_some(report.duration),
                }
            })
            .collect();

        step_results.extend(result.not_run.iter().map(|id| StepSummary {
            name: id.clone(),
            status: StatusKind::Blocked,
            detail: Some("not run".to_string()),
            duration: None,
        }));

        Self {
            network: result.network.clone(),
            step_results,
            total_duration: result.duration,
            steps_deployed: result.count(StepStatus::Deployed),
            steps_skipped: result.count(StepStatus::Skipped),
            contracts_deployed: result
                .steps
                .iter()
                .map(|r| r.newly_deployed().count())
                .sum(),
            verification_failures: result.verification_failures().count(),
            failed_step: result.failure.as_ref().map(|f| f.step.clone()),
            success: result.success(),
        }
    }
}
