//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait and is routed by
//! [`CommandDispatcher`]. Commands share configuration and record loading
//! through [`project::Project`].

pub mod completions;
pub mod deploy;
pub mod dispatcher;
pub mod plan;
pub mod project;
pub mod status;
pub mod verify;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
