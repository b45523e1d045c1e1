//! Status symbols shared by the summary, `status` and `plan` output.

use super::theme::DeployTheme;
use crate::runner::PlanAction;
use crate::steps::StepStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Success,
    Failed,
    Skipped,
    Pending,
    /// Never reached because an earlier step failed.
    Blocked,
    Warning,
}

impl StatusKind {
    pub fn icon(self) -> &'static str {
        match self {
            Self::Success => "✓",
            Self::Failed => "✗",
            Self::Skipped => "○",
            Self::Pending => "◌",
            Self::Blocked => "⊘",
            Self::Warning => "⚠",
        }
    }

    /// Text label for logs without unicode.
    pub fn bracketed(self) -> &'static str {
        match self {
            Self::Success => "[ok]",
            Self::Failed => "[FAIL]",
            Self::Skipped => "[skip]",
            Self::Pending => "[pending]",
            Self::Blocked => "[blocked]",
            Self::Warning => "[warn]",
        }
    }

    pub fn styled(self, theme: &DeployTheme) -> String {
        let icon = self.icon();
        match self {
            Self::Success => theme.success.apply_to(icon).to_string(),
            Self::Failed => theme.error.apply_to(icon).to_string(),
            Self::Skipped | Self::Pending => theme.dim.apply_to(icon).to_string(),
            Self::Blocked | Self::Warning => theme.warning.apply_to(icon).to_string(),
        }
    }
}

impl From<StepStatus> for StatusKind {
    fn from(status: StepStatus) -> Self {
        match status {
            StepStatus::Deployed => Self::Success,
            StepStatus::Failed => Self::Failed,
            StepStatus::Skipped => Self::Skipped,
        }
    }
}

impl From<&PlanAction> for StatusKind {
    fn from(action: &PlanAction) -> Self {
        match action {
            PlanAction::Run => Self::Pending,
            PlanAction::Redeploy => Self::Warning,
            PlanAction::Skip(_) => Self::Skipped,
            PlanAction::Satisfied => Self::Success,
        }
    }
}
