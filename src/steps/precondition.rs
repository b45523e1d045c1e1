//! Whether a step should run on this network.

use std::fmt;

use crate::environment::Environment;

/// Result of evaluating a [`Precondition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Run,
    Skip(String),
    /// Run and redeploy even recorded contracts.
    ForceRedeploy,
}

impl Decision {
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip(_))
    }
}

type Check = Box<dyn Fn(&Environment<'_>) -> Decision>;

/// Condition evaluated before a step runs.
#[derive(Default)]
pub enum Precondition {
    #[default]
    Always,
    /// Run only when the network carries the tag.
    NetworkTag(String),
    Custom(Check),
}

impl Precondition {
    pub fn network_tag(tag: impl Into<String>) -> Self {
        Self::NetworkTag(tag.into())
    }

    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(&Environment<'_>) -> Decision + 'static,
    {
        Self::Custom(Box::new(check))
    }

    pub fn evaluate(&self, env: &Environment<'_>) -> Decision {
        match self {
            Self::Always => Decision::Run,
            Self::NetworkTag(tag) if env.network().has_tag(tag) => Decision::Run,
            Self::NetworkTag(tag) => Decision::Skip(format!(
                "network '{}' is not tagged {}",
                env.network().name,
                tag
            )),
            Self::Custom(check) => check(env),
        }
    }
}

impl fmt::Debug for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "Always"),
            Self::NetworkTag(tag) => write!(f, "NetworkTag({:?})", tag),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
