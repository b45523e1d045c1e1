//! Deployment steps.
//!
//! - [`Step`] - An id, tags, dependency references and an action
//! - [`Precondition`] - Evaluated to a [`Decision`] before the action runs
//! - [`ActionOutcome`] - How an action ended
//! - [`catalog`] - The ENS deployment steps
//!
//! # Example
//!
//! ```
//! use ens_deploy::environment::DeployOptions;
//! use ens_deploy::steps::{ActionOutcome, Precondition, Step};
//!
//! let step = Step::new("root", |env| {
//!     let registry = env.get("ENSRegistry")?;
//!     env.deploy(
//!         "Root",
//!         DeployOptions::from("deployer").args(vec![registry.address.into()]),
//!     )?;
//!     Ok(ActionOutcome::Completed)
//! })
//! .tags(&["root", "Root"])
//! .depends_on(&["ENSRegistry"])
//! .produces(&["Root"])
//! .precondition(Precondition::network_tag("use_root"));
//!
//! assert!(step.matches("Root"));
//! ```

pub mod catalog;
pub mod precondition;
pub mod step;

pub use catalog::ens_steps;
pub use precondition::{Decision, Precondition};
pub use step::{ActionOutcome, Step, StepStatus};
