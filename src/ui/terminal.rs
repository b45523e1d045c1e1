//! Colored terminal UI.

use std::io::Write;

use console::Term;

use super::progress::format_duration;
use super::{
    should_use_colors, DeployTheme, NonInteractiveUI, OutputMode, ProgressSpinner, RunSummary,
    SpinnerHandle, UserInterface,
};

/// UI for an interactive terminal.
pub struct TerminalUI {
    term: Term,
    theme: DeployTheme,
    mode: OutputMode,
}

impl TerminalUI {
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            DeployTheme::new()
        } else {
            DeployTheme::plain()
        };

        Self {
            term: Term::stdout(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        let mut stderr = Term::stderr();
        writeln!(stderr, "{}", self.theme.format_error(msg)).ok();
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            Box::new(ProgressSpinner::new(message))
        } else {
            Box::new(ProgressSpinner::hidden())
        }
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn show_progress(&mut self, current: usize, total: usize) {
        if self.mode.shows_status() {
            writeln!(
                self.term,
                "{}",
                self.theme.dim.apply_to(format!("[{}/{}]", current, total))
            )
            .ok();
        }
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "  {}", self.theme.hint.apply_to(hint)).ok();
        }
    }

    fn show_run_header(&mut self, network: &str, step_count: usize, dry_run: bool) {
        if !self.mode.shows_status() {
            return;
        }
        let step_label = if step_count == 1 { "step" } else { "steps" };
        let mode = if dry_run { " · dry run" } else { "" };
        writeln!(
            self.term,
            "\n{} {}\n",
            self.theme.format_header(network),
            self.theme
                .dim
                .apply_to(format!("· {} {}{}", step_count, step_label, mode)),
        )
        .ok();
    }

    fn show_run_summary(&mut self, summary: &RunSummary) {
        if !self.mode.shows_summary() {
            return;
        }

        let b = &self.theme.border;
        writeln!(self.term).ok();
        writeln!(self.term, "  {}", b.apply_to("┌─ Summary ──────────────────────────")).ok();

        let width = summary
            .step_results
            .iter()
            .map(|s| s.name.len())
            .max()
            .unwrap_or(0);
        for step in &summary.step_results {
            let right = match (step.duration, step.detail.as_deref()) {
                (Some(d), Some(detail)) => format!(
                    "{} {}",
                    self.theme.dim.apply_to(detail),
                    self.theme.duration.apply_to(format_duration(d))
                ),
                (Some(d), None) => self.theme.duration.apply_to(format_duration(d)).to_string(),
                (None, Some(detail)) => self.theme.dim.apply_to(detail).to_string(),
                (None, None) => String::new(),
            };
            writeln!(
                self.term,
                "  {} {} {:<width$}  {}",
                b.apply_to("│"),
                step.status.styled(&self.theme),
                step.name,
                right,
                width = width,
            )
            .ok();
        }

        writeln!(self.term, "  {}", b.apply_to("├────────────────────────────────────")).ok();
        writeln!(
            self.term,
            "  {} {} {} {} deployed {} {} skipped {} {} new contracts",
            b.apply_to("│"),
            self.theme
                .duration
                .apply_to(format_duration(summary.total_duration)),
            self.theme.dim.apply_to("·"),
            summary.steps_deployed,
            self.theme.dim.apply_to("·"),
            summary.steps_skipped,
            self.theme.dim.apply_to("·"),
            summary.contracts_deployed,
        )
        .ok();
        writeln!(self.term, "  {}", b.apply_to("└────────────────────────────────────")).ok();
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

/// Terminal UI on a TTY, plain lines otherwise.
pub fn create_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    if interactive && Term::stdout().is_term() {
        Box::new(TerminalUI::new(mode))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}
