//! Deployment through external command-line tools.
//!
//! Each operation renders an argv template from [`BackendConfig`], runs it
//! with [`crate::shell::execute`] and reads the result from the last JSON
//! line the tool prints (`forge create --json`, `cast send --json`).

use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, info};

use super::{DeployBackend, DeployReceipt, DeployRequest, SendRequest};
use crate::config::{resolve_string, BackendConfig, InterpolationContext};
use crate::environment::{Account, NetworkInfo};
use crate::error::{DeployError, Result};
use crate::shell::{execute, CommandOptions, CommandResult};
use crate::types::Address;

/// Runs `forge`/`cast` (or whatever the templates name) as subprocesses.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    config: BackendConfig,
    context: InterpolationContext,
    workdir: Option<PathBuf>,
    redact: Vec<String>,
}

impl CommandBackend {
    /// `context` supplies the run variables and network built-ins.
    pub fn new(config: BackendConfig, context: InterpolationContext) -> Self {
        Self {
            config,
            context,
            workdir: None,
            redact: Vec::new(),
        }
    }

    pub fn with_workdir(mut self, workdir: PathBuf) -> Self {
        self.workdir = Some(workdir);
        self
    }

    /// Values to mask in logs and errors.
    pub fn with_redacted(mut self, secrets: Vec<String>) -> Self {
        self.redact = secrets;
        self
    }

    fn call_context(&self, network: &NetworkInfo) -> Result<InterpolationContext> {
        let mut context = self.context.clone();
        context
            .builtins
            .insert("network".to_string(), network.name.clone());
        context
            .builtins
            .insert("chain_id".to_string(), network.chain_id.to_string());
        let rpc_url = rpc_url(network, &context)?;
        context.set("rpc_url", rpc_url);
        Ok(context)
    }

    fn run(
        &self,
        template: &[String],
        context: &InterpolationContext,
        extra: Vec<String>,
    ) -> Result<CommandResult> {
        let mut argv = render(template, context)?;
        argv.extend(extra);

        let mut redact = self.redact.clone();
        if let Some(key) = context.call.get("private_key") {
            redact.push(key.clone());
        }

        let options = CommandOptions {
            cwd: self.workdir.clone(),
            redact,
            ..Default::default()
        };
        execute(&argv, &options)
    }
}

/// Resolve the network's rpc url template against `context`.
pub(crate) fn rpc_url(network: &NetworkInfo, context: &InterpolationContext) -> Result<String> {
    let template = network
        .rpc_url
        .as_deref()
        .ok_or_else(|| DeployError::ConfigValidationError {
            message: format!("Network '{}' has no rpc_url", network.name),
        })?;
    resolve_string(template, context)
}

/// Interpolate every element of an argv template.
pub(crate) fn render(template: &[String], context: &InterpolationContext) -> Result<Vec<String>> {
    template
        .iter()
        .map(|part| resolve_string(part, context))
        .collect()
}

fn signer_key<'a>(account: &'a Account) -> Result<&'a str> {
    account
        .private_key()
        .ok_or_else(|| DeployError::UnknownAccount {
            name: account.name.clone(),
            message: "no private key to sign with".to_string(),
        })
}

fn parse_output(result: &CommandResult, contract: &str) -> Result<Value> {
    let line = result
        .last_stdout_line()
        .ok_or_else(|| DeployError::DeployTransaction {
            contract: contract.to_string(),
            message: "command printed no output".to_string(),
        })?;

    serde_json::from_str(line).map_err(|e| DeployError::DeployTransaction {
        contract: contract.to_string(),
        message: format!("unreadable command output ({}): {}", e, line),
    })
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(String::from)
}

impl DeployBackend for CommandBackend {
    fn deploy(
        &mut self,
        network: &NetworkInfo,
        request: &DeployRequest<'_>,
    ) -> Result<DeployReceipt> {
        let mut context = self.call_context(network)?;
        context
            .set("contract", request.contract)
            .set("artifact", request.artifact)
            .set("private_key", signer_key(request.from)?);
        if let Some(from) = request.from.address() {
            context.set("from", from.as_str());
        }

        let mut extra = Vec::new();
        if !request.args.is_empty() {
            extra.push(self.config.args_flag.clone());
            extra.extend(request.args.iter().map(|a| a.to_cli()));
        }

        info!("Deploying {} on {}", request.contract, network.name);
        let result = self.run(&self.config.deploy, &context, extra)?;
        if !result.success {
            return Err(DeployError::DeployTransaction {
                contract: request.contract.to_string(),
                message: result.error_output().to_string(),
            });
        }

        let output = parse_output(&result, request.contract)?;
        let address = string_field(&output, &self.config.address_field)
            .ok_or_else(|| DeployError::DeployTransaction {
                contract: request.contract.to_string(),
                message: format!("output has no '{}' field", self.config.address_field),
            })?;
        let address = Address::parse(&address).map_err(|_| DeployError::DeployTransaction {
            contract: request.contract.to_string(),
            message: format!("'{}' is not an address", address),
        })?;

        let transaction_hash = string_field(&output, &self.config.tx_hash_field);
        debug!(
            "{} deployed at {} (tx {:?})",
            request.contract, address, transaction_hash
        );

        Ok(DeployReceipt {
            address,
            transaction_hash,
        })
    }

    fn send(&mut self, network: &NetworkInfo, request: &SendRequest<'_>) -> Result<Option<String>> {
        let mut context = self.call_context(network)?;
        context
            .set("contract", request.contract)
            .set("address", request.address.as_str())
            .set("signature", request.signature)
            .set("private_key", signer_key(request.from)?);

        let extra = request.args.iter().map(|a| a.to_cli()).collect();

        info!(
            "Calling {}.{} on {}",
            request.contract, request.signature, network.name
        );
        let result = self.run(&self.config.send, &context, extra)?;
        if !result.success {
            return Err(DeployError::DeployTransaction {
                contract: request.contract.to_string(),
                message: format!("{} failed: {}", request.signature, result.error_output()),
            });
        }

        // Tools without --json still succeed; the hash is then unknown.
        Ok(parse_output(&result, request.contract)
            .ok()
            .and_then(|output| string_field(&output, &self.config.tx_hash_field)))
    }

    fn account_address(&mut self, account: &Account) -> Result<Address> {
        if let Some(address) = account.address() {
            return Ok(address.clone());
        }

        let mut context = self.context.clone();
        context.set("private_key", signer_key(account)?);
        let result = self.run(&self.config.address, &context, Vec::new())?;

        let line = result.last_stdout_line().unwrap_or_default();
        if !result.success || line.is_empty() {
            return Err(DeployError::UnknownAccount {
                name: account.name.clone(),
                message: format!("could not derive address: {}", result.error_output()),
            });
        }

        Address::parse(line).map_err(|_| DeployError::UnknownAccount {
            name: account.name.clone(),
            message: format!("'{}' is not an address", line),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContractArg;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    fn deployer() -> Account {
        Account::new("deployer").with_private_key("0xkey")
    }

    #[test]
    fn render_fills_placeholders() {
        let mut context = InterpolationContext::new();
        context.set("artifact", "Root").set("rpc_url", "http://x");
        let template = argv(&["forge", "create", "${artifact}", "--rpc-url", "${rpc_url}"]);

        let rendered = render(&template, &context).unwrap();

        assert_eq!(
            rendered,
            argv(&["forge", "create", "Root", "--rpc-url", "http://x"])
        );
    }

    #[test]
    fn render_fails_on_unknown_placeholder() {
        assert!(render(&argv(&["${nope}"]), &InterpolationContext::new()).is_err());
    }

    #[test]
    fn rpc_url_requires_variables() {
        let network = NetworkInfo {
            rpc_url: Some("${BLAST_RPC_URL}".to_string()),
            ..NetworkInfo::local("blast", &[])
        };
        let err = rpc_url(&network, &InterpolationContext::new()).unwrap_err();
        assert!(err.to_string().contains("BLAST_RPC_URL"));
    }

    #[test]
    fn deploy_without_key_is_account_error() {
        let mut backend = CommandBackend::new(BackendConfig::default(), InterpolationContext::new());
        let account = Account::new("deployer");
        let err = backend
            .deploy(
                &NetworkInfo::local("localhost", &[]),
                &DeployRequest {
                    contract: "Root",
                    artifact: "Root",
                    from: &account,
                    args: &[],
                },
            )
            .unwrap_err();
        assert!(matches!(err, DeployError::UnknownAccount { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn deploy_parses_json_output_and_appends_args() {
        let config = BackendConfig {
            deploy: argv(&[
                "sh",
                "-c",
                "echo compiling; echo \"{\\\"deployedTo\\\":\\\"0x00000000000000000000000000000000000000aa\\\",\\\"transactionHash\\\":\\\"0xbeef\\\"}\"",
                "forge",
                "${artifact}",
            ]),
            ..Default::default()
        };
        let mut backend = CommandBackend::new(config, InterpolationContext::new());
        let account = deployer();
        let args = vec![ContractArg::Uint(21), ContractArg::Text("0xabc".into())];

        let receipt = backend
            .deploy(
                &NetworkInfo::local("localhost", &[]),
                &DeployRequest {
                    contract: "Root",
                    artifact: "Root",
                    from: &account,
                    args: &args,
                },
            )
            .unwrap();

        assert_eq!(receipt.address.as_str(), "0x00000000000000000000000000000000000000aa");
        assert_eq!(receipt.transaction_hash.as_deref(), Some("0xbeef"));
    }

    #[cfg(unix)]
    #[test]
    fn failing_deploy_error_masks_private_key() {
        let config = BackendConfig {
            deploy: argv(&["sh", "-c", "echo \"bad key $0\" >&2; exit 1", "${private_key}"]),
            ..Default::default()
        };
        let mut backend = CommandBackend::new(config, InterpolationContext::new());
        let account = deployer();

        let err = backend
            .deploy(
                &NetworkInfo::local("localhost", &[]),
                &DeployRequest {
                    contract: "Root",
                    artifact: "Root",
                    from: &account,
                    args: &[],
                },
            )
            .unwrap_err();

        assert!(matches!(err, DeployError::DeployTransaction { ref contract, .. } if contract == "Root"));
        assert!(err.to_string().contains("bad key ***"));
        assert!(!err.to_string().contains("0xkey"));
    }

    #[cfg(unix)]
    #[test]
    fn send_tolerates_non_json_output() {
        let config = BackendConfig {
            send: argv(&["echo", "sent"]),
            ..Default::default()
        };
        let mut backend = CommandBackend::new(config, InterpolationContext::new());
        let account = deployer();
        let address = Address::zero();

        let hash = backend
            .send(
                &NetworkInfo::local("localhost", &[]),
                &SendRequest {
                    contract: "Root",
                    address: &address,
                    from: &account,
                    signature: "setController(address,bool)",
                    args: &[],
                },
            )
            .unwrap();
        assert!(hash.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn account_address_reads_tool_output() {
        let config = BackendConfig {
            address: argv(&["echo", "0x00000000000000000000000000000000000000bb"]),
            ..Default::default()
        };
        let mut backend = CommandBackend::new(config, InterpolationContext::new());
        let address = backend.account_address(&deployer()).unwrap();
        assert_eq!(address.as_str(), "0x00000000000000000000000000000000000000bb");
    }

    #[test]
    fn account_address_prefers_known_address() {
        let mut backend = CommandBackend::new(BackendConfig::default(), InterpolationContext::new());
        let account = Account::new("owner").with_address(Address::zero());
        assert_eq!(backend.account_address(&account).unwrap(), Address::zero());
    }
}
