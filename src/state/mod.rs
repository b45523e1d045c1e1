//! Deployment state persistence.

pub mod record;

pub use record::{DeploymentEntry, DeploymentRecord, StepCompletion};
