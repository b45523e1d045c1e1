//! Subprocess execution.
//!
//! Commands are run directly from an argv vector, never through a shell, so
//! interpolated values (addresses, urls, keys) cannot be re-parsed.

use crate::error::{DeployError, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
    pub success: bool,
}

impl CommandResult {
    /// Last non-empty stdout line, where `--json` tools print their result.
    pub fn last_stdout_line(&self) -> Option<&str> {
        self.stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
    }

    /// Trimmed stderr, falling back to stdout when stderr is empty.
    pub fn error_output(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Extra environment variables (merged with the inherited env).
    pub env: HashMap<String, String>,

    /// Values masked in logs and error messages (private keys, api keys).
    pub redact: Vec<String>,
}

impl CommandOptions {
    /// Replace every redacted value in `text` with `***`.
    pub fn mask(&self, text: &str) -> String {
        self.redact
            .iter()
            .filter(|s| !s.is_empty())
            .fold(text.to_string(), |shown, secret| {
                shown.replace(secret.as_str(), "***")
            })
    }

    /// Render argv for display with redacted values masked.
    pub fn display(&self, argv: &[String]) -> String {
        self.mask(&argv.join(" "))
    }
}

/// Run `argv[0]` with the remaining elements as arguments, capturing output.
///
/// Redacted values are masked in the captured output as well.
///
/// A non-zero exit is returned as an unsuccessful [`CommandResult`], not an
/// error; failing to start the program is `CommandFailed`.
pub fn execute(argv: &[String], options: &CommandOptions) -> Result<CommandResult> {
    let shown = options.display(argv);
    let Some((program, args)) = argv.split_first() else {
        return Err(DeployError::CommandFailed {
            command: shown,
            code: None,
        });
    };

    debug!("Executing: {}", shown);
    let start = Instant::now();

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }
    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    let output = cmd.output().map_err(|e| {
        debug!("Failed to start {}: {}", program, e);
        DeployError::CommandFailed {
            command: shown.clone(),
            code: None,
        }
    })?;

    let result = CommandResult {
        exit_code: output.status.code(),
        stdout: options.mask(&String::from_utf8_lossy(&output.stdout)),
        stderr: options.mask(&String::from_utf8_lossy(&output.stderr)),
        duration: start.elapsed(),
        success: output.status.success(),
    };

    debug!(
        "Command finished in {:?} with exit code {:?}",
        result.duration, result.exit_code
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout() {
        let result = execute(&argv(&["echo", "deployed"]), &CommandOptions::default()).unwrap();
        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout.trim(), "deployed");
    }

    #[cfg(unix)]
    #[test]
    fn arguments_are_not_shell_expanded() {
        let result = execute(&argv(&["echo", "$HOME;ls"]), &CommandOptions::default()).unwrap();
        assert_eq!(result.stdout.trim(), "$HOME;ls");
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_unsuccessful_result() {
        let result = execute(
            &argv(&["sh", "-c", "echo boom >&2; exit 3"]),
            &CommandOptions::default(),
        )
        .unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.error_output(), "boom");
    }

    #[cfg(unix)]
    #[test]
    fn passes_extra_env() {
        let mut options = CommandOptions::default();
        options
            .env
            .insert("ENS_DEPLOY_TEST".to_string(), "42".to_string());
        let result = execute(&argv(&["sh", "-c", "echo $ENS_DEPLOY_TEST"]), &options).unwrap();
        assert_eq!(result.stdout.trim(), "42");
    }

    #[test]
    fn missing_program_is_command_failed() {
        let err = execute(
            &argv(&["ens-deploy-definitely-not-a-program"]),
            &CommandOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DeployError::CommandFailed { code: None, .. }));
    }

    #[test]
    fn failed_start_reports_masked_command() {
        let options = CommandOptions {
            redact: vec!["0xsecret".to_string()],
            ..Default::default()
        };
        let err = execute(
            &argv(&["ens-deploy-definitely-not-a-program", "--private-key", "0xsecret"]),
            &options,
        )
        .unwrap_err();

        match err {
            DeployError::CommandFailed { command, .. } => {
                assert_eq!(
                    command,
                    "ens-deploy-definitely-not-a-program --private-key ***"
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_argv_is_command_failed() {
        assert!(execute(&[], &CommandOptions::default()).is_err());
    }

    #[test]
    fn display_masks_secrets() {
        let options = CommandOptions {
            redact: vec!["0xsecret".to_string()],
            ..Default::default()
        };
        let shown = options.display(&argv(&["forge", "--private-key", "0xsecret"]));
        assert_eq!(shown, "forge --private-key ***");
    }

    #[cfg(unix)]
    #[test]
    fn captured_output_is_masked() {
        let options = CommandOptions {
            redact: vec!["0xsecret".to_string()],
            ..Default::default()
        };
        let result = execute(&argv(&["echo", "key=0xsecret"]), &options).unwrap();
        assert_eq!(result.stdout.trim(), "key=***");
    }

    #[test]
    fn last_stdout_line_skips_blank_lines() {
        let result = CommandResult {
            exit_code: Some(0),
            stdout: "Compiling...\n{\"deployedTo\":\"0x1\"}\n\n".to_string(),
            stderr: String::new(),
            duration: Duration::ZERO,
            success: true,
        };
        assert_eq!(result.last_stdout_line(), Some("{\"deployedTo\":\"0x1\"}"));
    }
}
