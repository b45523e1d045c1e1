//! Plain line output for CI and pipes.

use super::progress::format_duration;
use super::{OutputMode, RunSummary, SpinnerHandle, UserInterface};

/// UI without colors or redraws.
///
/// Step progress prints as one line per start and finish, which keeps CI
/// logs readable.
pub struct NonInteractiveUI {
    mode: OutputMode,
}

impl NonInteractiveUI {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            println!("  {}", message);
        }
        Box::new(LineSpinner {
            enabled: self.mode.shows_spinners(),
        })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn show_progress(&mut self, current: usize, total: usize) {
        if self.mode.shows_status() {
            println!("[{}/{}]", current, total);
        }
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_status() {
            println!("  {}", hint);
        }
    }

    fn show_run_header(&mut self, network: &str, step_count: usize, dry_run: bool) {
        if self.mode.shows_status() {
            let step_label = if step_count == 1 { "step" } else { "steps" };
            let mode = if dry_run { " · dry run" } else { "" };
            println!("\n{} · {} {}{}\n", network, step_count, step_label, mode);
        }
    }

    fn show_run_summary(&mut self, summary: &RunSummary) {
        if !self.mode.shows_summary() {
            return;
        }

        println!();
        println!("Summary:");
        for step in &summary.step_results {
            let duration = step.duration.map(format_duration).unwrap_or_default();
            println!(
                "  {} {} {} {}",
                step.status.bracketed(),
                step.name,
                step.detail.as_deref().unwrap_or(""),
                duration
            );
        }
        println!(
            "Total: {} · {} deployed · {} skipped · {} new contracts",
            format_duration(summary.total_duration),
            summary.steps_deployed,
            summary.steps_skipped,
            summary.contracts_deployed,
        );
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Prints the finish line instead of animating.
struct LineSpinner {
    enabled: bool,
}

impl SpinnerHandle for LineSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        if self.enabled {
            println!("  ✓ {}", msg);
        }
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("  ✗ {}", msg);
    }

    fn finish_skipped(&mut self, msg: &str) {
        if self.enabled {
            println!("  ○ {}", msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_interactive() {
        let ui = NonInteractiveUI::new(OutputMode::Normal);
        assert!(!ui.is_interactive());
    }

    #[test]
    fn spinner_finishes_in_silent_mode() {
        let mut ui = NonInteractiveUI::new(OutputMode::Silent);
        let mut spinner = ui.start_spinner("registry");
        spinner.set_message("registry");
        spinner.finish_skipped("registry");
    }
}
