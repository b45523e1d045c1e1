//! A single deployment step.

use std::fmt;

use super::precondition::Precondition;
use crate::environment::Environment;
use crate::error::Result;

/// How a step action ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// The action decided there was nothing to do. Not a failure.
    Skipped { reason: String },
}

impl ActionOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }
}

/// Status of a finished step.
///
/// A step is pending until the runner reaches it and running while its
/// action executes (see `RunProgress`); these are the states it ends in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Step ran and its effects were committed.
    Deployed,

    /// Step failed; the run stopped here.
    Failed,

    /// Precondition not met, action skipped or already satisfied.
    Skipped,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Deployed => "deployed",
            StepStatus::Failed => "failed",
            StepStatus::Skipped => "skipped",
        };
        write!(f, "{}", s)
    }
}

type Action = Box<dyn Fn(&mut Environment<'_>) -> Result<ActionOutcome>>;

/// A unit of deployment work with declared dependencies.
///
/// `dependencies` name other steps by id or by tag. `produces` lists the
/// contracts the step records; a step whose contracts are all recorded and
/// whose completion is marked is not run again.
pub struct Step {
    pub id: String,
    pub tags: Vec<String>,
    pub dependencies: Vec<String>,
    pub produces: Vec<String>,
    pub precondition: Precondition,
    action: Action,
}

impl Step {
    pub fn new<F>(id: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut Environment<'_>) -> Result<ActionOutcome> + 'static,
    {
        Self {
            id: id.into(),
            tags: Vec::new(),
            dependencies: Vec::new(),
            produces: Vec::new(),
            precondition: Precondition::Always,
            action: Box::new(action),
        }
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        for tag in tags {
            if !self.has_tag(tag) {
                self.tags.push(tag.to_string());
            }
        }
        self
    }

    pub fn depends_on(mut self, references: &[&str]) -> Self {
        for reference in references {
            if !self.dependencies.iter().any(|d| d == reference) {
                self.dependencies.push(reference.to_string());
            }
        }
        self
    }

    pub fn produces(mut self, contracts: &[&str]) -> Self {
        self.produces
            .extend(contracts.iter().map(|c| c.to_string()));
        self
    }

    pub fn precondition(mut self, precondition: Precondition) -> Self {
        self.precondition = precondition;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Whether `selector` names this step by id or tag.
    pub fn matches(&self, selector: &str) -> bool {
        self.id == selector || self.has_tag(selector)
    }

    /// Run the action.
    pub fn run(&self, env: &mut Environment<'_>) -> Result<ActionOutcome> {
        (self.action)(env)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("id", &self.id)
            .field("tags", &self.tags)
            .field("dependencies", &self.dependencies)
            .field("produces", &self.produces)
            .field("precondition", &self.precondition)
            .finish_non_exhaustive()
    }
}
