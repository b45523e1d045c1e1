//! Pipeline execution.
//!
//! The runner walks the resolved order one step at a time. A step's new
//! deployments are committed to the record (and the record saved) only once
//! its action has returned successfully, so after a failure the record holds
//! exactly the steps completed before it.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::dependency::resolve_order;
use crate::backend::{DeployBackend, SimulatedBackend, SimulatedVerifier, Verifier, VerifyOutcome};
use crate::environment::{
    DeployResult, DeployedContract, Environment, RunContext, StepEffects, StepOptions,
};
use crate::error::{DeployError, Result};
use crate::state::DeploymentRecord;
use crate::steps::{ActionOutcome, Decision, Step, StepStatus};

/// Options for a pipeline run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Only run steps matching these ids or tags (plus their dependencies).
    pub only: Vec<String>,
    /// Redeploy steps matching these ids or tags.
    pub force: Vec<String>,
    /// Submit verifications.
    pub verify: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            only: Vec::new(),
            force: Vec::new(),
            verify: true,
        }
    }
}

impl RunOptions {
    fn forces(&self, step: &Step) -> bool {
        self.force.iter().any(|selector| step.matches(selector))
    }
}

/// Progress events emitted during a run.
#[derive(Debug)]
pub enum RunProgress<'a> {
    /// A step is about to start.
    StepStarting {
        id: &'a str,
        index: usize,
        total: usize,
    },
    /// A step finished, whatever its status.
    StepFinished { report: &'a StepReport },
}

/// What happened to one step.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub id: String,
    pub status: StepStatus,
    /// Why the step was skipped.
    pub reason: Option<String>,
    /// Skipped because an earlier run already deployed and completed it.
    pub satisfied: bool,
    /// Contracts deployed or reused.
    pub deployments: Vec<DeployedContract>,
    /// Wiring calls sent.
    pub wiring: Vec<String>,
    pub verifications: Vec<VerifyOutcome>,
    /// Error message when the step failed.
    pub error: Option<String>,
    pub duration: Duration,
}

impl StepReport {
    fn new(id: &str, status: StepStatus) -> Self {
        Self {
            id: id.to_string(),
            status,
            reason: None,
            satisfied: false,
            deployments: Vec::new(),
            wiring: Vec::new(),
            verifications: Vec::new(),
            error: None,
            duration: Duration::ZERO,
        }
    }

    fn skipped(id: &str, reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::new(id, StepStatus::Skipped)
        }
    }

    fn with_effects(mut self, effects: &StepEffects) -> Self {
        self.deployments = effects.deployments.clone();
        self.wiring = effects.wiring.clone();
        self.verifications = effects.verifications.clone();
        self
    }

    /// Contracts this step deployed, as opposed to reused.
    pub fn newly_deployed(&self) -> impl Iterator<Item = &DeployedContract> {
        self.deployments.iter().filter(|d| d.result.newly_deployed)
    }
}

/// The step that stopped the run.
#[derive(Debug)]
pub struct StepFailure {
    pub step: String,
    pub error: DeployError,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step '{}' failed: {}", self.step, self.error)
    }
}

/// Result of running the pipeline.
#[derive(Debug)]
pub struct PipelineResult {
    pub network: String,
    /// Reports for every step reached, in execution order.
    pub steps: Vec<StepReport>,
    /// Steps never reached because an earlier one failed.
    pub not_run: Vec<String>,
    pub failure: Option<StepFailure>,
    pub duration: Duration,
}

impl PipelineResult {
    pub fn success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn report(&self, id: &str) -> Option<&StepReport> {
        self.steps.iter().find(|r| r.id == id)
    }

    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|r| r.status == status).count()
    }

    /// Ids of steps that ran, in order.
    pub fn executed(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|r| r.status != StepStatus::Skipped)
            .map(|r| r.id.as_str())
            .collect()
    }

    pub fn verification_failures(&self) -> impl Iterator<Item = &VerifyOutcome> {
        self.steps
            .iter()
            .flat_map(|r| r.verifications.iter())
            .filter(|v| v.is_failed())
    }
}

/// What a run would do with a step, without doing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanAction {
    Run,
    Redeploy,
    Skip(String),
    /// Already deployed and completed.
    Satisfied,
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanAction::Run => write!(f, "run"),
            PlanAction::Redeploy => write!(f, "redeploy"),
            PlanAction::Skip(reason) => write!(f, "skip ({})", reason),
            PlanAction::Satisfied => write!(f, "up to date"),
        }
    }
}

/// One line of a plan.
#[derive(Debug, Clone)]
pub struct PlannedStep {
    pub id: String,
    pub tags: Vec<String>,
    pub action: PlanAction,
}

enum StepRun {
    Skipped(StepReport),
    Finished {
        outcome: ActionOutcome,
        effects: StepEffects,
    },
    Failed {
        error: DeployError,
        effects: StepEffects,
    },
}

/// Runs steps against a record, a backend and a verifier.
pub struct PipelineRunner<'a> {
    steps: &'a [Step],
}

impl<'a> PipelineRunner<'a> {
    pub fn new(steps: &'a [Step]) -> Self {
        Self { steps }
    }

    /// Indices of the steps a run would execute, in order.
    pub fn order(&self, options: &RunOptions) -> Result<Vec<usize>> {
        resolve_order(self.steps, &options.only)
    }

    fn is_satisfied(step: &Step, record: &DeploymentRecord) -> bool {
        record.is_step_complete(&step.id) && record.contains_all(&step.produces)
    }

    fn recorded_deployments(step: &Step, record: &DeploymentRecord) -> Vec<DeployedContract> {
        step.produces
            .iter()
            .filter_map(|name| {
                record.get(name).map(|entry| DeployedContract {
                    name: name.clone(),
                    result: DeployResult {
                        address: entry.address.clone(),
                        transaction_hash: entry.transaction_hash.clone(),
                        newly_deployed: false,
                    },
                })
            })
            .collect()
    }

    /// Run the pipeline.
    ///
    /// Resolver errors are returned before any step runs. A step failure is
    /// reported in [`PipelineResult::failure`].
    pub fn run(
        &self,
        context: &mut RunContext,
        record: &mut DeploymentRecord,
        backend: &mut dyn DeployBackend,
        verifier: &mut dyn Verifier,
        options: &RunOptions,
    ) -> Result<PipelineResult> {
        self.run_with_progress(context, record, backend, verifier, options, |_| {})
    }

    /// Run the pipeline with a progress callback.
    pub fn run_with_progress(
        &self,
        context: &mut RunContext,
        record: &mut DeploymentRecord,
        backend: &mut dyn DeployBackend,
        verifier: &mut dyn Verifier,
        options: &RunOptions,
        mut on_progress: impl FnMut(RunProgress<'_>),
    ) -> Result<PipelineResult> {
        let start = Instant::now();
        let order = self.order(options)?;
        let total = order.len();

        info!(
            "Running {} steps on {} (chain {})",
            total, context.network.name, context.network.chain_id
        );

        let mut reports = Vec::with_capacity(total);
        let mut failure: Option<StepFailure> = None;
        let mut not_run = Vec::new();

        for (position, &index) in order.iter().enumerate() {
            let step = &self.steps[index];

            if failure.is_some() {
                not_run.push(step.id.clone());
                continue;
            }

            on_progress(RunProgress::StepStarting {
                id: &step.id,
                index: position,
                total,
            });

            let started = Instant::now();
            let run = self.execute_step(step, context, record, backend, verifier, options);

            let mut report = match run {
                StepRun::Skipped(report) => report,
                StepRun::Finished { outcome, effects } => {
                    match self.commit(step, record, &outcome, &effects) {
                        Ok(()) => match outcome {
                            ActionOutcome::Completed => {
                                StepReport::new(&step.id, StepStatus::Deployed)
                                    .with_effects(&effects)
                            }
                            ActionOutcome::Skipped { reason } => {
                                StepReport::skipped(&step.id, reason).with_effects(&effects)
                            }
                        },
                        Err(error) => self.fail(step, error, &effects, &mut failure),
                    }
                }
                StepRun::Failed { error, effects } => {
                    Self::keep_confirmed(step, record, &effects);
                    self.fail(step, error, &effects, &mut failure)
                }
            };
            report.duration = started.elapsed();

            on_progress(RunProgress::StepFinished { report: &report });
            reports.push(report);
        }

        Ok(PipelineResult {
            network: context.network.name.clone(),
            steps: reports,
            not_run,
            failure,
            duration: start.elapsed(),
        })
    }

    fn fail(
        &self,
        step: &Step,
        error: DeployError,
        effects: &StepEffects,
        failure: &mut Option<StepFailure>,
    ) -> StepReport {
        warn!("Step '{}' failed: {}", step.id, error);
        let mut report = StepReport::new(&step.id, StepStatus::Failed).with_effects(effects);
        report.error = Some(error.to_string());
        *failure = Some(StepFailure {
            step: step.id.clone(),
            error,
        });
        report
    }

    fn execute_step(
        &self,
        step: &Step,
        context: &mut RunContext,
        record: &DeploymentRecord,
        backend: &mut dyn DeployBackend,
        verifier: &mut dyn Verifier,
        options: &RunOptions,
    ) -> StepRun {
        let step_options = StepOptions {
            force: options.forces(step),
            verify: options.verify,
        };
        let mut env = Environment::new(&step.id, context, record, backend, verifier, step_options);

        match step.precondition.evaluate(&env) {
            Decision::Skip(reason) => {
                info!("Skipping {}: {}", step.id, reason);
                return StepRun::Skipped(StepReport::skipped(&step.id, reason));
            }
            Decision::ForceRedeploy => env.set_forced(true),
            Decision::Run => {}
        }

        if !env.is_forced() && Self::is_satisfied(step, record) {
            debug!("{} already deployed", step.id);
            let mut report = StepReport::skipped(&step.id, "already deployed");
            report.satisfied = true;
            report.deployments = Self::recorded_deployments(step, record);
            return StepRun::Skipped(report);
        }

        info!("Running {}", step.id);
        let outcome = step.run(&mut env);
        let effects = env.finish();

        match outcome {
            Ok(outcome) => StepRun::Finished { outcome, effects },
            Err(error) => StepRun::Failed { error, effects },
        }
    }

    /// Record contracts a failed step already got confirmed, without marking
    /// the step complete. The next run reuses them and retries the rest.
    fn keep_confirmed(step: &Step, record: &mut DeploymentRecord, effects: &StepEffects) {
        if effects.staged.is_empty() {
            return;
        }
        for (name, entry) in &effects.staged {
            record.insert(name.clone(), entry.clone());
        }
        if let Err(e) = record.save() {
            warn!("Could not save deployments of failed step '{}': {}", step.id, e);
        }
    }

    fn commit(
        &self,
        step: &Step,
        record: &mut DeploymentRecord,
        outcome: &ActionOutcome,
        effects: &StepEffects,
    ) -> Result<()> {
        for (name, entry) in &effects.staged {
            record.insert(name.clone(), entry.clone());
        }
        if *outcome == ActionOutcome::Completed {
            record.mark_step_complete(step.id.clone(), effects.wiring.clone());
        }
        record.save()
    }

    /// What a run with `options` would do, with no side effects.
    pub fn plan(
        &self,
        context: &RunContext,
        record: &DeploymentRecord,
        options: &RunOptions,
    ) -> Result<Vec<PlannedStep>> {
        let order = self.order(options)?;
        let mut context = context.clone();
        let mut backend = SimulatedBackend::new();
        let mut verifier = SimulatedVerifier::new();

        let mut planned = Vec::with_capacity(order.len());
        for index in order {
            let step = &self.steps[index];
            let env = Environment::new(
                &step.id,
                &mut context,
                record,
                &mut backend,
                &mut verifier,
                StepOptions::default(),
            );

            let action = match step.precondition.evaluate(&env) {
                Decision::Skip(reason) => PlanAction::Skip(reason),
                Decision::ForceRedeploy => PlanAction::Redeploy,
                Decision::Run if options.forces(step) => PlanAction::Redeploy,
                Decision::Run if Self::is_satisfied(step, record) => PlanAction::Satisfied,
                Decision::Run => PlanAction::Run,
            };

            planned.push(PlannedStep {
                id: step.id.clone(),
                tags: step.tags.clone(),
                action,
            });
        }

        Ok(planned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{Account, DeployOptions, NamedAccounts, NetworkInfo};
    use crate::steps::Precondition;
    use crate::types::ContractArg;
    use tempfile::TempDir;

    fn context(tags: &[&str]) -> RunContext {
        RunContext::new(NetworkInfo::local("test", tags)).with_accounts(
            NamedAccounts::from_accounts(vec![Account::new("deployer").with_private_key("0x01")]),
        )
    }

    fn deploying(id: &str, contract: &'static str) -> Step {
        Step::new(id, move |env| {
            env.deploy(contract, DeployOptions::from("deployer"))?;
            Ok(ActionOutcome::Completed)
        })
        .produces(&[contract])
    }

    /// A, B(deps A, takes A's address), C(deps A).
    fn scenario() -> Vec<Step> {
        vec![
            deploying("a", "A"),
            Step::new("b", |env| {
                let a = env.get("A")?;
                env.deploy(
                    "B",
                    DeployOptions::from("deployer").args(vec![a.address.into()]),
                )?;
                Ok(ActionOutcome::Completed)
            })
            .depends_on(&["a"])
            .produces(&["B"]),
            deploying("c", "C").depends_on(&["a"]),
        ]
    }

    fn run(
        steps: &[Step],
        record: &mut DeploymentRecord,
        backend: &mut SimulatedBackend,
        options: &RunOptions,
    ) -> PipelineResult {
        let mut ctx = context(&[]);
        let mut verifier = SimulatedVerifier::new();
        PipelineRunner::new(steps)
            .run(&mut ctx, record, backend, &mut verifier, options)
            .unwrap()
    }

    #[test]
    fn scenario_runs_in_order_and_records_everything() {
        let steps = scenario();
        let mut record = DeploymentRecord::new("test", 31337);
        let mut backend = SimulatedBackend::new();

        let result = run(&steps, &mut record, &mut backend, &RunOptions::default());

        assert!(result.success());
        assert_eq!(result.executed(), vec!["a", "b", "c"]);
        assert!(record.contains_all(&["A", "B", "C"]));
        let a = record.get("A").unwrap().address.clone();
        assert_eq!(record.get("B").unwrap().args, vec![ContractArg::from(a)]);
        assert!(record.is_step_complete("b"));
    }

    #[test]
    fn rerun_is_a_no_op() {
        let steps = scenario();
        let mut record = DeploymentRecord::new("test", 31337);
        let mut first = SimulatedBackend::new();
        run(&steps, &mut record, &mut first, &RunOptions::default());

        let mut second = SimulatedBackend::new();
        let result = run(&steps, &mut record, &mut second, &RunOptions::default());

        assert!(result.success());
        assert_eq!(second.deploy_count(), 0);
        assert_eq!(result.count(StepStatus::Skipped), 3);
        assert!(result.steps.iter().all(|r| r.satisfied));
        assert_eq!(result.report("a").unwrap().deployments.len(), 1);
    }

    #[test]
    fn failure_aborts_and_keeps_only_completed_steps() {
        let steps = scenario();
        let mut record = DeploymentRecord::new("test", 31337);
        let mut backend = SimulatedBackend::new().fail_deploy_of("B");

        let result = run(&steps, &mut record, &mut backend, &RunOptions::default());

        let failure = result.failure.as_ref().unwrap();
        assert_eq!(failure.step, "b");
        assert!(matches!(failure.error, DeployError::DeployTransaction { .. }));
        assert_eq!(result.not_run, vec!["c"]);
        assert!(record.get("A").is_some());
        assert!(record.get("B").is_none());
        assert!(record.get("C").is_none());
        assert_eq!(result.report("b").unwrap().status, StepStatus::Failed);
    }

    #[test]
    fn failed_step_keeps_contracts_it_already_deployed() {
        let steps = vec![Step::new("pair", |env| {
            env.deploy("First", DeployOptions::from("deployer"))?;
            env.deploy("Second", DeployOptions::from("deployer"))?;
            Ok(ActionOutcome::Completed)
        })
        .produces(&["First", "Second"])];
        let mut record = DeploymentRecord::new("test", 31337);
        let mut backend = SimulatedBackend::new().fail_deploy_of("Second");

        let result = run(&steps, &mut record, &mut backend, &RunOptions::default());

        assert!(!result.success());
        assert!(record.get("First").is_some());
        assert!(record.get("Second").is_none());
        assert!(!record.is_step_complete("pair"));

        let mut working = SimulatedBackend::new();
        let result = run(&steps, &mut record, &mut working, &RunOptions::default());
        assert!(result.success());
        assert_eq!(working.deploy_count(), 1);
        assert_eq!(working.deploys()[0].contract, "Second");
    }

    #[test]
    fn wiring_failure_leaves_step_incomplete_and_retries_wiring() {
        let steps = vec![Step::new("wire", |env| {
            env.deploy("Root", DeployOptions::from("deployer"))?;
            env.execute("Root", "deployer", "setController(address,bool)", vec![])?;
            Ok(ActionOutcome::Completed)
        })
        .produces(&["Root"])];
        let mut record = DeploymentRecord::new("test", 31337);

        let mut failing = SimulatedBackend::new().fail_send_of("setController(address,bool)");
        let result = run(&steps, &mut record, &mut failing, &RunOptions::default());
        assert!(!result.success());
        assert_eq!(failing.deploy_count(), 1);
        let first_root = record.get("Root").unwrap().address.clone();
        assert!(!record.is_step_complete("wire"));

        let mut working = SimulatedBackend::new();
        let result = run(&steps, &mut record, &mut working, &RunOptions::default());
        assert!(result.success());
        assert_eq!(working.deploy_count(), 0);
        assert_eq!(working.sends().len(), 1);
        assert_eq!(record.get("Root").unwrap().address, first_root);
        assert!(record.is_step_complete("wire"));
    }

    #[test]
    fn failed_step_deployments_are_saved_to_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.json");
        let steps = vec![Step::new("wire", |env| {
            env.deploy("Root", DeployOptions::from("deployer"))?;
            env.execute("Root", "deployer", "setController(address,bool)", vec![])?;
            Ok(ActionOutcome::Completed)
        })];
        let mut record = DeploymentRecord::new("test", 31337).with_path(&path);
        let mut failing = SimulatedBackend::new().fail_send_of("setController(address,bool)");

        run(&steps, &mut record, &mut failing, &RunOptions::default());

        let saved = DeploymentRecord::load(&path, "test", 31337).unwrap();
        assert!(saved.get("Root").is_some());
        assert!(!saved.is_step_complete("wire"));
    }

    #[test]
    fn skipped_precondition_does_not_block_dependents() {
        let steps = vec![
            deploying("legacy", "Legacy").precondition(Precondition::network_tag("legacy")),
            deploying("after", "After").depends_on(&["legacy"]),
        ];
        let mut record = DeploymentRecord::new("test", 31337);
        let mut backend = SimulatedBackend::new();

        let result = run(&steps, &mut record, &mut backend, &RunOptions::default());

        assert!(result.success());
        assert_eq!(result.report("legacy").unwrap().status, StepStatus::Skipped);
        assert!(!result.report("legacy").unwrap().satisfied);
        assert_eq!(result.report("after").unwrap().status, StepStatus::Deployed);
        assert!(record.get("Legacy").is_none());
    }

    #[test]
    fn verification_failure_does_not_stop_the_run() {
        let steps = vec![
            Step::new("a", |env| {
                let a = env.deploy("A", DeployOptions::from("deployer"))?;
                env.verify_if_new("A", &a);
                Ok(ActionOutcome::Completed)
            }),
            deploying("b", "B").depends_on(&["a"]),
        ];
        let mut ctx = context(&[]);
        ctx.network.explorer = Some(Default::default());
        let mut record = DeploymentRecord::new("test", 31337);
        let mut backend = SimulatedBackend::new();
        let mut verifier = SimulatedVerifier::failing();

        let result = PipelineRunner::new(&steps)
            .run(&mut ctx, &mut record, &mut backend, &mut verifier, &RunOptions::default())
            .unwrap();

        assert!(result.success());
        assert_eq!(result.report("a").unwrap().status, StepStatus::Deployed);
        assert_eq!(result.verification_failures().count(), 1);
        assert!(record.get("A").is_some());
        assert!(record.get("B").is_some());
    }

    #[test]
    fn action_skip_signal_is_not_a_failure() {
        let steps = vec![Step::new("noop", |_| Ok(ActionOutcome::skipped("nothing to do")))];
        let mut record = DeploymentRecord::new("test", 31337);
        let mut backend = SimulatedBackend::new();

        let result = run(&steps, &mut record, &mut backend, &RunOptions::default());

        assert!(result.success());
        let report = result.report("noop").unwrap();
        assert_eq!(report.status, StepStatus::Skipped);
        assert_eq!(report.reason.as_deref(), Some("nothing to do"));
        assert!(!record.is_step_complete("noop"));
    }

    #[test]
    fn force_selector_redeploys() {
        let steps = scenario();
        let mut record = DeploymentRecord::new("test", 31337);
        let mut first = SimulatedBackend::new();
        run(&steps, &mut record, &mut first, &RunOptions::default());
        let old = record.get("C").unwrap().address.clone();

        let mut second = SimulatedBackend::new();
        let options = RunOptions {
            force: vec!["c".to_string()],
            ..Default::default()
        };
        let result = run(&steps, &mut record, &mut second, &options);

        assert!(result.success());
        assert_eq!(second.deploy_count(), 1);
        assert_eq!(second.deploys()[0].contract, "C");
        assert_ne!(record.get("C").unwrap().address, old);
    }

    #[test]
    fn precondition_can_force_redeploy() {
        let steps = vec![deploying("a", "A").precondition(Precondition::custom(|_| {
            Decision::ForceRedeploy
        }))];
        let mut record = DeploymentRecord::new("test", 31337);
        let mut first = SimulatedBackend::new();
        run(&steps, &mut record, &mut first, &RunOptions::default());

        let mut second = SimulatedBackend::new();
        run(&steps, &mut record, &mut second, &RunOptions::default());

        assert_eq!(second.deploy_count(), 1);
    }

    #[test]
    fn only_filter_runs_selection_with_dependencies() {
        let steps = scenario();
        let mut record = DeploymentRecord::new("test", 31337);
        let mut backend = SimulatedBackend::new();
        let options = RunOptions {
            only: vec!["b".to_string()],
            ..Default::default()
        };

        let result = run(&steps, &mut record, &mut backend, &options);

        assert_eq!(result.executed(), vec!["a", "b"]);
        assert!(record.get("C").is_none());
    }

    #[test]
    fn resolver_error_runs_nothing() {
        let steps = vec![
            deploying("a", "A").depends_on(&["b"]),
            deploying("b", "B").depends_on(&["a"]),
        ];
        let mut ctx = context(&[]);
        let mut record = DeploymentRecord::new("test", 31337);
        let mut backend = SimulatedBackend::new();
        let mut verifier = SimulatedVerifier::new();

        let err = PipelineRunner::new(&steps)
            .run(&mut ctx, &mut record, &mut backend, &mut verifier, &RunOptions::default())
            .unwrap_err();

        assert!(matches!(err, DeployError::CircularDependency { .. }));
        assert_eq!(backend.deploy_count(), 0);
    }

    #[test]
    fn committed_steps_are_saved_to_disk() {
        let temp = TempDir::new().unwrap();
        let path = DeploymentRecord::path_for(temp.path(), "test");
        let steps = scenario();
        let mut record = DeploymentRecord::new("test", 31337).with_path(&path);
        let mut backend = SimulatedBackend::new().fail_deploy_of("C");

        run(&steps, &mut record, &mut backend, &RunOptions::default());

        let saved = DeploymentRecord::load(&path, "test", 31337).unwrap();
        assert!(saved.contains_all(&["A", "B"]));
        assert!(saved.get("C").is_none());
    }

    #[test]
    fn progress_events_cover_every_step() {
        let steps = scenario();
        let mut ctx = context(&[]);
        let mut record = DeploymentRecord::new("test", 31337);
        let mut backend = SimulatedBackend::new();
        let mut verifier = SimulatedVerifier::new();
        let mut started = Vec::new();
        let mut finished = Vec::new();

        PipelineRunner::new(&steps)
            .run_with_progress(
                &mut ctx,
                &mut record,
                &mut backend,
                &mut verifier,
                &RunOptions::default(),
                |event| match event {
                    RunProgress::StepStarting { id, .. } => started.push(id.to_string()),
                    RunProgress::StepFinished { report } => finished.push(report.status),
                },
            )
            .unwrap();

        assert_eq!(started, vec!["a", "b", "c"]);
        assert_eq!(finished, vec![StepStatus::Deployed; 3]);
    }

    #[test]
    fn plan_reports_without_deploying() {
        let steps = vec![
            deploying("a", "A"),
            deploying("legacy", "Legacy").precondition(Precondition::network_tag("legacy")),
            deploying("b", "B"),
        ];
        let mut record = DeploymentRecord::new("test", 31337);
        let mut backend = SimulatedBackend::new();
        run(&steps[..1], &mut record, &mut backend, &RunOptions::default());

        let options = RunOptions {
            force: vec!["b".to_string()],
            ..Default::default()
        };
        let plan = PipelineRunner::new(&steps)
            .plan(&context(&[]), &record, &options)
            .unwrap();

        let actions: Vec<&PlanAction> = plan.iter().map(|p| &p.action).collect();
        assert_eq!(actions[0], &PlanAction::Satisfied);
        assert!(matches!(actions[1], PlanAction::Skip(_)));
        assert_eq!(actions[2], &PlanAction::Redeploy);
    }
}
