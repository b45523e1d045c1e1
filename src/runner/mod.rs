//! Step ordering and pipeline execution.

pub mod dependency;
pub mod pipeline;

pub use dependency::{resolve_order, resolve_reference, select, DependencyGraph};
pub use pipeline::{
    PipelineResult, PipelineRunner, PlanAction, PlannedStep, RunOptions, RunProgress,
    StepFailure, StepReport,
};
