//! Block-explorer verification.
//!
//! Verification is fire-and-log: steps receive a [`VerifyOutcome`], a plain
//! value rather than a `Result`, so a failed submission cannot be propagated
//! with `?` into a pipeline failure.

use std::fmt;
use std::path::PathBuf;
use tracing::info;

use super::command::{render, rpc_url};
use super::{Verifier, VerifyRequest};
use crate::config::{BackendConfig, InterpolationContext};
use crate::environment::NetworkInfo;
use crate::state::DeploymentRecord;
use crate::error::VerificationError;
use crate::shell::{execute, CommandOptions};

/// What happened to one verification attempt.
#[derive(Debug, Clone)]
pub enum VerifyOutcome {
    Verified { contract: String, address: String },
    Skipped { contract: String, reason: String },
    Failed(VerificationError),
}

impl VerifyOutcome {
    pub fn contract(&self) -> &str {
        match self {
            Self::Verified { contract, .. } | Self::Skipped { contract, .. } => contract,
            Self::Failed(err) => &err.contract,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }
}

impl fmt::Display for VerifyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verified { contract, address } => {
                write!(f, "{} verified at {}", contract, address)
            }
            Self::Skipped { contract, reason } => {
                write!(f, "{} verification skipped: {}", contract, reason)
            }
            Self::Failed(err) => write!(f, "{}", err),
        }
    }
}

/// Runs `forge verify-contract` (or the configured template).
#[derive(Debug, Clone)]
pub struct CommandVerifier {
    template: Vec<String>,
    context: InterpolationContext,
    workdir: Option<PathBuf>,
}

impl CommandVerifier {
    pub fn new(config: &BackendConfig, context: InterpolationContext) -> Self {
        Self {
            template: config.verify.clone(),
            context,
            workdir: None,
        }
    }

    pub fn with_workdir(mut self, workdir: PathBuf) -> Self {
        self.workdir = Some(workdir);
        self
    }
}

/// Explorers answer resubmissions with an error that is really a success.
fn already_verified(output: &str) -> bool {
    output.to_lowercase().contains("already verified")
}

impl Verifier for CommandVerifier {
    fn verify(
        &mut self,
        network: &NetworkInfo,
        request: &VerifyRequest<'_>,
    ) -> Result<(), VerificationError> {
        let fail = |message: String| VerificationError {
            contract: request.contract.to_string(),
            address: request.address.to_string(),
            message,
        };

        let explorer = network
            .explorer
            .as_ref()
            .ok_or_else(|| fail(format!("network '{}' has no explorer", network.name)))?;

        let mut context = self.context.clone();
        context
            .builtins
            .insert("chain_id".to_string(), network.chain_id.to_string());
        context
            .builtins
            .insert("network".to_string(), network.name.clone());
        let rpc = rpc_url(network, &context).map_err(|e| fail(e.to_string()))?;
        let api_key = explorer
            .api_key
            .clone()
            .or_else(|| context.resolve("ETHERSCAN_API_KEY"))
            .unwrap_or_else(|| "verify".to_string());
        let args: Vec<String> = request.args.iter().map(|a| a.to_cli()).collect();

        context
            .set("address", request.address.as_str())
            .set("contract", request.contract)
            .set("artifact", request.artifact)
            .set("verifier_url", explorer.api_url.as_str())
            .set("api_key", api_key.as_str())
            .set("rpc_url", rpc)
            .set("args", args.join(","));

        let argv = render(&self.template, &context).map_err(|e| fail(e.to_string()))?;
        let options = CommandOptions {
            cwd: self.workdir.clone(),
            redact: vec![api_key],
            ..Default::default()
        };

        info!("Verifying {} at {}", request.contract, request.address);
        let result = execute(&argv, &options).map_err(|e| fail(e.to_string()))?;

        if result.success || already_verified(&result.stdout) || already_verified(&result.stderr) {
            Ok(())
        } else {
            Err(fail(result.error_output().to_string()))
        }
    }
}

/// Submit recorded deployments, one outcome per contract name.
///
/// Used to retry verifications that failed during a run.
pub fn verify_recorded(
    verifier: &mut dyn Verifier,
    network: &NetworkInfo,
    record: &DeploymentRecord,
    contracts: &[String],
) -> Vec<VerifyOutcome> {
    contracts
        .iter()
        .map(|contract| {
            let skipped = |reason: &str| VerifyOutcome::Skipped {
                contract: contract.clone(),
                reason: reason.to_string(),
            };
            if network.explorer.is_none() {
                return skipped("network has no block explorer");
            }
            let Some(entry) = record.get(contract) else {
                return skipped("no recorded deployment");
            };
            let request = VerifyRequest {
                contract,
                artifact: &entry.artifact,
                address: &entry.address,
                args: &entry.args,
            };
            match verifier.verify(network, &request) {
                Ok(()) => VerifyOutcome::Verified {
                    contract: contract.clone(),
                    address: entry.address.to_string(),
                },
                Err(err) => VerifyOutcome::Failed(err),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExplorerConfig;
    use crate::types::Address;

    fn explorer_network() -> NetworkInfo {
        NetworkInfo {
            explorer: Some(ExplorerConfig {
                api_url: "https://api.example/etherscan".to_string(),
                browser_url: None,
                api_key: Some("k".to_string()),
            }),
            ..NetworkInfo::local("blast", &[])
        }
    }

    fn verifier(template: &[&str]) -> CommandVerifier {
        let config = BackendConfig {
            verify: template.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        CommandVerifier::new(&config, InterpolationContext::new())
    }

    fn request(address: &Address) -> VerifyRequest<'_> {
        VerifyRequest {
            contract: "Root",
            artifact: "Root",
            address,
            args: &[],
        }
    }

    #[test]
    fn outcome_accessors() {
        let failed = VerifyOutcome::Failed(VerificationError {
            contract: "Root".into(),
            address: "0x1".into(),
            message: "timeout".into(),
        });
        assert!(failed.is_failed());
        assert_eq!(failed.contract(), "Root");
        assert!(failed.to_string().contains("timeout"));

        let skipped = VerifyOutcome::Skipped {
            contract: "LegacyPublicResolver".into(),
            reason: "disabled".into(),
        };
        assert!(!skipped.is_failed());
        assert!(!skipped.is_verified());
    }

    #[test]
    fn network_without_explorer_fails_softly() {
        let address = Address::zero();
        let err = verifier(&["true"])
            .verify(&NetworkInfo::local("localhost", &[]), &request(&address))
            .unwrap_err();
        assert!(err.message.contains("no explorer"));
    }

    #[cfg(unix)]
    #[test]
    fn successful_command_verifies() {
        let address = Address::zero();
        let result = verifier(&["echo", "${address}", "${verifier_url}"])
            .verify(&explorer_network(), &request(&address));
        assert!(result.is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn already_verified_counts_as_success() {
        let address = Address::zero();
        let script = "echo 'Contract source code already verified' >&2; exit 1";
        let result = verifier(&["sh", "-c", script]).verify(&explorer_network(), &request(&address));
        assert!(result.is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_is_verification_error() {
        let address = Address::zero();
        let err = verifier(&["sh", "-c", "echo 'rate limited' >&2; exit 1"])
            .verify(&explorer_network(), &request(&address))
            .unwrap_err();
        assert_eq!(err.contract, "Root");
        assert!(err.message.contains("rate limited"));
    }

    #[test]
    fn verify_recorded_reports_each_contract() {
        use crate::backend::SimulatedVerifier;
        use crate::state::DeploymentEntry;

        let mut record = DeploymentRecord::new("blast", 31337);
        record.insert(
            "Root",
            DeploymentEntry {
                address: Address::zero(),
                transaction_hash: None,
                args: Vec::new(),
                artifact: "Root".to_string(),
                deployed_at: chrono::Utc::now(),
            },
        );
        let mut verifier = SimulatedVerifier::new();
        let outcomes = verify_recorded(
            &mut verifier,
            &explorer_network(),
            &record,
            &["Root".to_string(), "ENSRegistry".to_string()],
        );

        assert!(outcomes[0].is_verified());
        assert!(matches!(
            &outcomes[1],
            VerifyOutcome::Skipped { reason, .. } if reason == "no recorded deployment"
        ));
        assert_eq!(verifier.submitted(), ["Root".to_string()]);
    }
}
