//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// ens-deploy - Dependency-ordered ENS contract deployments.
#[derive(Debug, Parser)]
#[command(name = "ens-deploy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides .ens-deploy/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show wiring calls and verification results
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Deploy to a network (default if no command specified)
    Deploy(DeployArgs),

    /// Show what a deploy would do without doing it
    Plan(PlanArgs),

    /// Show recorded deployments
    Status(StatusArgs),

    /// Re-submit recorded contracts for verification
    Verify(VerifyArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `deploy` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct DeployArgs {
    /// Network to deploy to (defaults to settings.default_network)
    #[arg(short, long, env = "ENS_DEPLOY_NETWORK")]
    pub network: Option<String>,

    /// Only run steps with these ids or tags, plus their dependencies
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Redeploy steps with these ids or tags even when recorded
    #[arg(short, long, value_delimiter = ',')]
    pub force: Vec<String>,

    /// Run against a simulated chain; nothing is persisted
    #[arg(long)]
    pub dry_run: bool,

    /// Skip block-explorer verification
    #[arg(long)]
    pub no_verify: bool,
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PlanArgs {
    /// Network to plan for
    #[arg(short, long, env = "ENS_DEPLOY_NETWORK")]
    pub network: Option<String>,

    /// Only plan steps with these ids or tags, plus their dependencies
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Plan a redeploy of these steps
    #[arg(short, long, value_delimiter = ',')]
    pub force: Vec<String>,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Network whose record to show
    #[arg(short, long, env = "ENS_DEPLOY_NETWORK")]
    pub network: Option<String>,

    /// Output the record as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `verify` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct VerifyArgs {
    /// Network whose contracts to verify
    #[arg(short, long, env = "ENS_DEPLOY_NETWORK")]
    pub network: Option<String>,

    /// Contracts to verify (defaults to every recorded contract)
    pub contracts: Vec<String>,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn help_describes_the_tool() {
        let help = Cli::command().render_help().to_string();
        assert!(help.contains("Dependency-ordered ENS contract deployments"));
    }

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["ens-deploy"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn deploy_accepts_comma_separated_and_repeated_selectors() {
        let cli = Cli::try_parse_from([
            "ens-deploy",
            "deploy",
            "--network",
            "blast",
            "--tags",
            "registry,root",
            "--force",
            "root",
            "--force",
            "registrar",
            "--dry-run",
        ])
        .unwrap();

        let Some(Commands::Deploy(args)) = cli.command else {
            panic!("expected deploy");
        };
        assert_eq!(args.network.as_deref(), Some("blast"));
        assert_eq!(args.tags, vec!["registry", "root"]);
        assert_eq!(args.force, vec!["root", "registrar"]);
        assert!(args.dry_run);
        assert!(!args.no_verify);
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["ens-deploy", "status", "--json", "--quiet"]).unwrap();
        assert!(cli.quiet);
        assert!(matches!(cli.command, Some(Commands::Status(StatusArgs { json: true, .. }))));
    }

    #[test]
    fn verify_takes_contract_names() {
        let cli =
            Cli::try_parse_from(["ens-deploy", "verify", "Root", "ENSRegistry"]).unwrap();
        let Some(Commands::Verify(args)) = cli.command else {
            panic!("expected verify");
        };
        assert_eq!(args.contracts, vec!["Root", "ENSRegistry"]);
    }
}
