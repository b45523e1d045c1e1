//! Shell completions generation.

use clap::CommandFactory;

use crate::cli::args::{Cli, CompletionsArgs};
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The completions command implementation.
pub struct CompletionsCommand {
    args: CompletionsArgs,
}

impl CompletionsCommand {
    pub fn new(args: CompletionsArgs) -> Self {
        Self { args }
    }

    /// Write the completion script for the requested shell.
    pub fn write_to(&self, out: &mut dyn std::io::Write) {
        let mut cmd = Cli::command();
        clap_complete::generate(self.args.shell, &mut cmd, "ens-deploy", out);
    }
}

impl Command for CompletionsCommand {
    fn execute(&self, _ui: &mut dyn UserInterface) -> Result<CommandResult> {
        self.write_to(&mut std::io::stdout());
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap_complete::Shell;

    fn script(shell: Shell) -> String {
        let mut buf = Vec::new();
        CompletionsCommand::new(CompletionsArgs { shell }).write_to(&mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn bash_completes_subcommands() {
        let output = script(Shell::Bash);
        assert!(output.contains("ens-deploy"));
        assert!(output.contains("deploy"));
        assert!(output.contains("--dry-run"));
    }

    #[test]
    fn zsh_and_fish_generate() {
        assert!(script(Shell::Zsh).contains("ens-deploy"));
        assert!(script(Shell::Fish).contains("ens-deploy"));
    }
}
