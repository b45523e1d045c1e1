//! Colors and symbols.

use console::Style;

/// Styles for deploy output.
#[derive(Debug, Clone)]
pub struct DeployTheme {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    /// Running steps and the header marker.
    pub info: Style,
    pub dim: Style,
    pub highlight: Style,
    /// Contract addresses.
    pub address: Style,
    pub duration: Style,
    pub border: Style,
    pub hint: Style,
    pub key: Style,
}

impl Default for DeployTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl DeployTheme {
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            info: Style::new().cyan(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            address: Style::new().cyan(),
            duration: Style::new().dim(),
            border: Style::new().dim(),
            hint: Style::new().cyan().dim(),
            key: Style::new().bold(),
        }
    }

    /// No colors, for pipes and `--no-color`.
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            address: Style::new(),
            duration: Style::new(),
            border: Style::new(),
            hint: Style::new(),
            key: Style::new(),
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    pub fn format_skipped(&self, msg: &str) -> String {
        format!("{}", self.dim.apply_to(format!("○ {}", msg)))
    }

    /// `Registry  0x5FbD...` with the address styled.
    pub fn format_contract(&self, name: &str, address: &str) -> String {
        format!("{} {}", self.key.apply_to(name), self.address.apply_to(address))
    }

    pub fn format_header(&self, title: &str) -> String {
        format!("{} {}", self.info.apply_to("◈"), self.highlight.apply_to(title))
    }
}

/// Colors are off when `NO_COLOR` is set or stdout is not a terminal.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    console::Term::stdout().is_term()
}
