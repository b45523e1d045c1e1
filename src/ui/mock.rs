//! Mock UI for testing.
//!
//! `MockUI` implements [`UserInterface`] and records everything it is asked
//! to show.
//!
//! # Example
//!
//! ```
//! use ens_deploy::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.message("Deploying to blast");
//! ui.success("Done");
//!
//! assert!(ui.has_message("blast"));
//! assert!(ui.has_success("Done"));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use super::{OutputMode, RunSummary, SpinnerHandle, UserInterface};

/// How a spinner was finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinnerStatus {
    Success,
    Error,
    Skipped,
}

type Finished = Rc<RefCell<Vec<(SpinnerStatus, String)>>>;

/// Records every UI call.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    hints: Vec<String>,
    progress: Vec<(usize, usize)>,
    spinners: Vec<String>,
    finished: Finished,
    run_headers: Vec<(String, usize, bool)>,
    summaries: Vec<RunSummary>,
}

impl MockUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    pub fn progress(&self) -> &[(usize, usize)] {
        &self.progress
    }

    /// Messages spinners were started with.
    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }

    /// Finish calls made on any spinner this UI handed out.
    pub fn finished_spinners(&self) -> Vec<(SpinnerStatus, String)> {
        self.finished.borrow().clone()
    }

    /// `(network, step_count, dry_run)` per run header.
    pub fn run_headers(&self) -> &[(String, usize, bool)] {
        &self.run_headers
    }

    pub fn summaries(&self) -> &[RunSummary] {
        &self.summaries
    }

    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }

    pub fn has_hint(&self, msg: &str) -> bool {
        self.hints.iter().any(|m| m.contains(msg))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners.push(message.to_string());
        Box::new(MockSpinner {
            messages: Vec::new(),
            finished: Rc::clone(&self.finished),
        })
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn show_progress(&mut self, current: usize, total: usize) {
        self.progress.push((current, total));
    }

    fn show_hint(&mut self, hint: &str) {
        self.hints.push(hint.to_string());
    }

    fn show_run_header(&mut self, network: &str, step_count: usize, dry_run: bool) {
        self.run_headers
            .push((network.to_string(), step_count, dry_run));
    }

    fn show_run_summary(&mut self, summary: &RunSummary) {
        self.summaries.push(summary.clone());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Spinner handed out by [`MockUI`].
#[derive(Debug)]
pub struct MockSpinner {
    messages: Vec<String>,
    finished: Finished,
}

impl MockSpinner {
    /// Messages set while spinning.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    fn finish(&mut self, status: SpinnerStatus, msg: &str) {
        self.finished.borrow_mut().push((status, msg.to_string()));
    }
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        self.finish(SpinnerStatus::Success, msg);
    }

    fn finish_error(&mut self, msg: &str) {
        self.finish(SpinnerStatus::Error, msg);
    }

    fn finish_skipped(&mut self, msg: &str) {
        self.finish(SpinnerStatus::Skipped, msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_messages_by_kind() {
        let mut ui = MockUI::new();
        ui.message("Deploying");
        ui.success("Registry deployed");
        ui.warning("constructor args changed");
        ui.error("reverted");
        ui.show_hint("run with --force");

        assert!(ui.has_message("Deploying"));
        assert!(ui.has_success("Registry"));
        assert!(ui.has_warning("constructor"));
        assert!(ui.has_error("reverted"));
        assert!(ui.has_hint("--force"));
        assert!(!ui.has_error("Registry"));
    }

    #[test]
    fn spinner_finishes_are_shared_with_ui() {
        let mut ui = MockUI::new();
        let mut first = ui.start_spinner("registry");
        first.finish_success("registry");
        let mut second = ui.start_spinner("legacy-resolver");
        second.finish_skipped("legacy-resolver");

        assert_eq!(ui.spinners(), ["registry", "legacy-resolver"]);
        assert_eq!(
            ui.finished_spinners(),
            vec![
                (SpinnerStatus::Success, "registry".to_string()),
                (SpinnerStatus::Skipped, "legacy-resolver".to_string()),
            ]
        );
    }

    #[test]
    fn records_run_headers_and_progress() {
        let mut ui = MockUI::with_mode(OutputMode::Quiet);
        ui.show_run_header("blast", 12, true);
        ui.show_progress(1, 12);

        assert_eq!(ui.output_mode(), OutputMode::Quiet);
        assert_eq!(ui.run_headers(), [("blast".to_string(), 12, true)]);
        assert_eq!(ui.progress(), [(1, 12)]);
    }
}
