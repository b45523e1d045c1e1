//! Output verbosity.

use std::str::FromStr;

/// How much a run prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Also print every wiring call and verification outcome.
    Verbose,
    /// Step progress and the summary.
    #[default]
    Normal,
    /// Spinners and the final status line.
    Quiet,
    /// Errors only.
    Silent,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbose" => Ok(Self::Verbose),
            "normal" => Ok(Self::Normal),
            "quiet" => Ok(Self::Quiet),
            "silent" => Ok(Self::Silent),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

impl OutputMode {
    /// Per-step details such as wiring calls.
    pub fn shows_details(&self) -> bool {
        matches!(self, Self::Verbose)
    }

    pub fn shows_spinners(&self) -> bool {
        !matches!(self, Self::Silent)
    }

    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Silent)
    }

    /// The summary table is left out of quiet runs.
    pub fn shows_summary(&self) -> bool {
        matches!(self, Self::Verbose | Self::Normal)
    }
}
