//! The per-step view handed to step actions and preconditions.
//!
//! An [`Environment`] reads recorded deployments, deploys contracts through
//! the backend, sends wiring transactions and submits verifications. Nothing
//! it deploys touches the [`DeploymentRecord`] directly: new entries are
//! staged and handed back by [`Environment::finish`], and the runner commits
//! them only once the step has succeeded.

use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::{Account, NamedAccounts, NetworkInfo, RunContext};
use crate::backend::{DeployBackend, DeployRequest, SendRequest, Verifier, VerifyOutcome, VerifyRequest};
use crate::error::{DeployError, Result};
use crate::state::{DeploymentEntry, DeploymentRecord};
use crate::types::{format_args, namehash, Address, ContractArg};

/// Outcome of a deploy call.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployResult {
    pub address: Address,
    pub transaction_hash: Option<String>,
    /// False when an existing deployment was reused.
    pub newly_deployed: bool,
}

impl DeployResult {
    fn reused(entry: &DeploymentEntry) -> Self {
        Self {
            address: entry.address.clone(),
            transaction_hash: entry.transaction_hash.clone(),
            newly_deployed: false,
        }
    }
}

/// Options for [`Environment::deploy`].
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    /// Named account to deploy from.
    pub from: String,
    /// Constructor arguments, in order.
    pub args: Vec<ContractArg>,
    /// Artifact to deploy when it differs from the recorded name.
    pub artifact: Option<String>,
}

impl DeployOptions {
    pub fn from(account: impl Into<String>) -> Self {
        Self {
            from: account.into(),
            ..Default::default()
        }
    }

    pub fn args(mut self, args: Vec<ContractArg>) -> Self {
        self.args = args;
        self
    }

    pub fn artifact(mut self, artifact: impl Into<String>) -> Self {
        self.artifact = Some(artifact.into());
        self
    }
}

/// A contract a step deployed or reused.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployedContract {
    pub name: String,
    pub result: DeployResult,
}

/// Everything a step did, collected by [`Environment::finish`].
#[derive(Debug, Default)]
pub struct StepEffects {
    /// New deployments to commit to the record.
    pub staged: Vec<(String, DeploymentEntry)>,
    pub deployments: Vec<DeployedContract>,
    /// Wiring transactions sent, as `Contract.signature`.
    pub wiring: Vec<String>,
    pub verifications: Vec<VerifyOutcome>,
}

/// Per-step switches set by the runner.
#[derive(Debug, Clone, Copy)]
pub struct StepOptions {
    /// Redeploy contracts even when recorded.
    pub force: bool,
    /// Submit verifications.
    pub verify: bool,
}

impl Default for StepOptions {
    fn default() -> Self {
        Self {
            force: false,
            verify: true,
        }
    }
}

/// Context a step executes against.
pub struct Environment<'a> {
    step: &'a str,
    network: &'a NetworkInfo,
    accounts: &'a mut NamedAccounts,
    vars: &'a HashMap<String, String>,
    tld: &'a str,
    record: &'a DeploymentRecord,
    backend: &'a mut dyn DeployBackend,
    verifier: &'a mut dyn Verifier,
    options: StepOptions,
    effects: StepEffects,
}

impl<'a> Environment<'a> {
    pub fn new(
        step: &'a str,
        context: &'a mut RunContext,
        record: &'a DeploymentRecord,
        backend: &'a mut dyn DeployBackend,
        verifier: &'a mut dyn Verifier,
        options: StepOptions,
    ) -> Self {
        let RunContext {
            network,
            accounts,
            vars,
            tld,
        } = context;

        Self {
            step,
            network,
            accounts,
            vars,
            tld,
            record,
            backend,
            verifier,
            options,
            effects: StepEffects::default(),
        }
    }

    /// Id of the step being executed.
    pub fn step(&self) -> &str {
        self.step
    }

    pub fn network(&self) -> &NetworkInfo {
        self.network
    }

    /// Whether the runner asked for a redeploy.
    pub fn is_forced(&self) -> bool {
        self.options.force
    }

    pub(crate) fn set_forced(&mut self, force: bool) {
        self.options.force = force;
    }

    /// Top-level domain the registrar manages.
    pub fn tld(&self) -> &str {
        self.tld
    }

    /// Namehash of the managed top-level domain.
    pub fn tld_node(&self) -> String {
        namehash(self.tld)
    }

    /// A run variable, treating blank values as unset.
    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// A run variable the step cannot proceed without.
    pub fn require_var(&self, key: &str) -> Result<&str> {
        self.var(key).ok_or_else(|| DeployError::MissingSetting {
            step: self.step.to_string(),
            key: key.to_string(),
        })
    }

    /// Public address of a named account.
    ///
    /// Accounts configured only with a key have their address derived once
    /// through the backend and remembered for the rest of the run.
    pub fn account(&mut self, name: &str) -> Result<Address> {
        let account = self.accounts.get(name)?;
        if let Some(address) = account.address() {
            return Ok(address.clone());
        }

        let account = account.clone();
        let address = self.backend.account_address(&account)?;
        if let Some(slot) = self.accounts.get_mut(name) {
            slot.set_address(address.clone());
        }
        Ok(address)
    }

    fn signer(&self, name: &str) -> Result<Account> {
        self.accounts.get(name).cloned()
    }

    fn staged(&self, contract: &str) -> Option<&DeploymentEntry> {
        self.effects
            .staged
            .iter()
            .rev()
            .find(|(name, _)| name == contract)
            .map(|(_, entry)| entry)
    }

    fn entry(&self, contract: &str) -> Option<&DeploymentEntry> {
        self.staged(contract).or_else(|| self.record.get(contract))
    }

    /// A deployment made earlier (by this step or a previous one).
    ///
    /// # Errors
    ///
    /// `UnresolvedDependency` when no deployment is known.
    pub fn get(&self, contract: &str) -> Result<DeployResult> {
        self.get_or_null(contract)
            .ok_or_else(|| DeployError::UnresolvedDependency {
                step: self.step.to_string(),
                contract: contract.to_string(),
            })
    }

    /// Like [`get`](Self::get), for deployments that may legitimately be absent.
    pub fn get_or_null(&self, contract: &str) -> Option<DeployResult> {
        self.entry(contract).map(DeployResult::reused)
    }

    /// Deploy `contract` unless it is already recorded.
    ///
    /// A recorded deployment is reused (`newly_deployed == false`) unless the
    /// step is forced; a contract deployed earlier in the same step is always
    /// reused.
    pub fn deploy(&mut self, contract: &str, options: DeployOptions) -> Result<DeployResult> {
        if let Some(entry) = self.staged(contract) {
            return Ok(DeployResult::reused(entry));
        }

        if !self.options.force {
            if let Some(entry) = self.record.get(contract) {
                if entry.args != options.args {
                    warn!(
                        "{} is recorded with arguments {} but {} were requested; \
                         reusing the recorded deployment (use --force to redeploy)",
                        contract,
                        format_args(&entry.args),
                        format_args(&options.args)
                    );
                }
                debug!("Reusing {} at {}", contract, entry.address);
                let result = DeployResult::reused(entry);
                self.effects.deployments.push(DeployedContract {
                    name: contract.to_string(),
                    result: result.clone(),
                });
                return Ok(result);
            }
        }

        let from = self.signer(&options.from)?;
        let artifact = options
            .artifact
            .clone()
            .unwrap_or_else(|| contract.to_string());

        let receipt = self.backend.deploy(
            self.network,
            &DeployRequest {
                contract,
                artifact: &artifact,
                from: &from,
                args: &options.args,
            },
        )?;
        info!("{} deployed at {}", contract, receipt.address);

        self.effects.staged.push((
            contract.to_string(),
            DeploymentEntry {
                address: receipt.address.clone(),
                transaction_hash: receipt.transaction_hash.clone(),
                args: options.args,
                artifact,
                deployed_at: Utc::now(),
            },
        ));

        let result = DeployResult {
            address: receipt.address,
            transaction_hash: receipt.transaction_hash,
            newly_deployed: true,
        };
        self.effects.deployments.push(DeployedContract {
            name: contract.to_string(),
            result: result.clone(),
        });
        Ok(result)
    }

    /// Send a wiring transaction to a deployed contract.
    ///
    /// Failures are `DeployTransaction` errors and fail the step.
    pub fn execute(
        &mut self,
        contract: &str,
        from: &str,
        signature: &str,
        args: Vec<ContractArg>,
    ) -> Result<Option<String>> {
        let target = self.get(contract)?;
        let signer = self.signer(from)?;

        let hash = self.backend.send(
            self.network,
            &SendRequest {
                contract,
                address: &target.address,
                from: &signer,
                signature,
                args: &args,
            },
        )?;
        info!("{}.{} {}", contract, signature, format_args(&args));

        self.effects
            .wiring
            .push(format!("{}.{}", contract, signature));
        Ok(hash)
    }

    /// Submit a known deployment for verification.
    ///
    /// Never fails: the outcome is logged, recorded for the step report and
    /// returned.
    pub fn verify(&mut self, contract: &str) -> VerifyOutcome {
        let outcome = self.submit_verification(contract);
        match &outcome {
            VerifyOutcome::Verified { .. } => info!("{}", outcome),
            VerifyOutcome::Skipped { .. } => debug!("{}", outcome),
            VerifyOutcome::Failed(err) => warn!("{}", err),
        }
        self.effects.verifications.push(outcome.clone());
        outcome
    }

    /// Verify only freshly deployed contracts.
    pub fn verify_if_new(&mut self, contract: &str, result: &DeployResult) -> VerifyOutcome {
        if result.newly_deployed {
            return self.verify(contract);
        }

        let outcome = VerifyOutcome::Skipped {
            contract: contract.to_string(),
            reason: "not newly deployed".to_string(),
        };
        self.effects.verifications.push(outcome.clone());
        outcome
    }

    fn submit_verification(&mut self, contract: &str) -> VerifyOutcome {
        let skipped = |reason: &str| VerifyOutcome::Skipped {
            contract: contract.to_string(),
            reason: reason.to_string(),
        };

        if !self.options.verify {
            return skipped("verification disabled");
        }
        if self.network.explorer.is_none() {
            return skipped("network has no block explorer");
        }
        let Some(entry) = self.entry(contract).cloned() else {
            return skipped("no recorded deployment");
        };

        let request = VerifyRequest {
            contract,
            artifact: &entry.artifact,
            address: &entry.address,
            args: &entry.args,
        };
        match self.verifier.verify(self.network, &request) {
            Ok(()) => VerifyOutcome::Verified {
                contract: contract.to_string(),
                address: entry.address.to_string(),
            },
            Err(err) => VerifyOutcome::Failed(err),
        }
    }

    /// Hand back what the step did.
    pub fn finish(self) -> StepEffects {
        self.effects
    }
}
