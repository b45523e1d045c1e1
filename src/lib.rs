//! ens-deploy - Dependency-ordered ENS contract deployments.
//!
//! Deployment steps declare what they depend on and what they produce. The
//! runner orders them, skips the ones already recorded for the target
//! network, deploys the rest through a pluggable backend and records every
//! confirmed contract so the next run picks up where this one stopped.
//!
//! # Modules
//!
//! - [`backend`] - Transaction submission and block-explorer verification
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`environment`] - Network, accounts and the per-step accessor
//! - [`error`] - Error types and result aliases
//! - [`runner`] - Dependency resolution and the pipeline runner
//! - [`shell`] - Subprocess execution
//! - [`state`] - The persisted deployment record
//! - [`steps`] - Step model and the ENS step catalog
//! - [`types`] - Addresses, contract arguments and namehash
//! - [`ui`] - Spinners, summaries and terminal output
//!
//! # Example
//!
//! ```
//! use ens_deploy::backend::{SimulatedBackend, SimulatedVerifier};
//! use ens_deploy::environment::{Account, DeployOptions, NamedAccounts, NetworkInfo, RunContext};
//! use ens_deploy::runner::{PipelineRunner, RunOptions};
//! use ens_deploy::state::DeploymentRecord;
//! use ens_deploy::steps::{ActionOutcome, Step};
//!
//! let steps = vec![
//!     Step::new("registry", |env| {
//!         env.deploy("ENSRegistry", DeployOptions::from("deployer"))?;
//!         Ok(ActionOutcome::Completed)
//!     })
//!     .produces(&["ENSRegistry"]),
//!     Step::new("root", |env| {
//!         let registry = env.get("ENSRegistry")?;
//!         env.deploy(
//!             "Root",
//!             DeployOptions::from("deployer").args(vec![registry.address.into()]),
//!         )?;
//!         Ok(ActionOutcome::Completed)
//!     })
//!     .depends_on(&["registry"])
//!     .produces(&["Root"]),
//! ];
//!
//! let mut context = RunContext::new(NetworkInfo::local("localhost", &[])).with_accounts(
//!     NamedAccounts::from_accounts(vec![Account::new("deployer")]),
//! );
//! let mut record = DeploymentRecord::new("localhost", 31337);
//! let result = PipelineRunner::new(&steps)
//!     .run(
//!         &mut context,
//!         &mut record,
//!         &mut SimulatedBackend::new(),
//!         &mut SimulatedVerifier::new(),
//!         &RunOptions::default(),
//!     )
//!     .unwrap();
//!
//! assert!(result.success());
//! assert_eq!(result.executed(), vec!["registry", "root"]);
//! assert!(record.contains_all(&["ENSRegistry", "Root"]));
//! ```

pub mod backend;
pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod runner;
pub mod shell;
pub mod state;
pub mod steps;
pub mod types;
pub mod ui;

pub use error::{DeployError, Result};
