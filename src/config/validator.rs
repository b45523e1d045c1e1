//! Configuration validation rules.
//!
//! - The default network must exist
//! - Networks need a chain id and an RPC url
//! - Live networks must not share a chain id
//! - Named accounts need a key source and a resolvable fallback chain
//! - Backend argv templates must not be empty

use crate::config::schema::DeployConfig;
use crate::error::{DeployError, Result};
use crate::types::Address;
use std::collections::{BTreeMap, HashSet};

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
    /// Network name if the error is network-specific
    pub network: Option<String>,
    /// Account name if the error is account-specific
    pub account: Option<String>,
}

impl ValidationError {
    fn network(rule: &str, name: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            network: Some(name.to_string()),
            account: None,
        }
    }

    fn account(rule: &str, name: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            network: None,
            account: Some(name.to_string()),
        }
    }

    fn general(rule: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            network: None,
            account: None,
        }
    }
}

/// Validate a configuration and return every error found.
pub fn validate_config(config: &DeployConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_networks(config));
    errors.extend(validate_accounts(config));
    errors.extend(validate_backend(config));

    errors
}

fn validate_networks(config: &DeployConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let networks = config.all_networks();

    if !networks.contains_key(&config.settings.default_network) {
        errors.push(ValidationError::general(
            "unknown-default-network",
            format!(
                "Default network '{}' is not defined",
                config.settings.default_network
            ),
        ));
    }

    let mut live_chain_ids: BTreeMap<u64, &str> = BTreeMap::new();

    for (name, network) in &networks {
        if network.chain_id == 0 {
            errors.push(ValidationError::network(
                "missing-chain-id",
                name,
                format!("Network '{}' must set a non-zero chain_id", name),
            ));
        }

        if network.rpc_url.as_deref().map_or(true, |u| u.trim().is_empty()) {
            errors.push(ValidationError::network(
                "missing-rpc-url",
                name,
                format!("Network '{}' has no rpc_url", name),
            ));
        }

        if network.live {
            if let Some(other) = live_chain_ids.insert(network.chain_id, name) {
                errors.push(ValidationError::network(
                    "duplicate-chain-id",
                    name,
                    format!(
                        "Networks '{}' and '{}' both use chain id {}",
                        other, name, network.chain_id
                    ),
                ));
            }
        }

        if let Some(verify) = &network.verify {
            if verify.api_url.trim().is_empty() {
                errors.push(ValidationError::network(
                    "missing-verify-url",
                    name,
                    format!("Network '{}' has a verify block without api_url", name),
                ));
            }
        }
    }

    errors
}

fn validate_accounts(config: &DeployConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let accounts = config.accounts();

    for (name, account) in &accounts {
        if account.key_env.is_none() && account.address.is_none() && account.fallback.is_none() {
            errors.push(ValidationError::account(
                "account-without-source",
                name,
                format!(
                    "Account '{}' needs key_env, address or fallback",
                    name
                ),
            ));
        }

        if let Some(address) = &account.address {
            if Address::parse(address).is_err() {
                errors.push(ValidationError::account(
                    "invalid-address",
                    name,
                    format!("Account '{}' has invalid address '{}'", name, address),
                ));
            }
        }

        // Walk the fallback chain looking for an unknown link or a loop.
        let mut seen = HashSet::new();
        seen.insert(name.as_str());
        let mut next = account.fallback.as_deref();
        while let Some(fallback) = next {
            let Some(target) = accounts.get(fallback) else {
                errors.push(ValidationError::account(
                    "unknown-fallback",
                    name,
                    format!(
                        "Account '{}' falls back to '{}' which is not defined",
                        name, fallback
                    ),
                ));
                break;
            };
            if !seen.insert(fallback) {
                errors.push(ValidationError::account(
                    "fallback-cycle",
                    name,
                    format!("Account '{}' has a fallback cycle through '{}'", name, fallback),
                ));
                break;
            }
            next = target.fallback.as_deref();
        }
    }

    errors
}

fn validate_backend(config: &DeployConfig) -> Vec<ValidationError> {
    let backend = &config.backend;
    [
        ("deploy", &backend.deploy),
        ("send", &backend.send),
        ("verify", &backend.verify),
        ("address", &backend.address),
    ]
    .into_iter()
    .filter(|(_, argv)| argv.is_empty())
    .map(|(name, _)| {
        ValidationError::general(
            "empty-command",
            format!("backend.{} must name a command", name),
        )
    })
    .collect()
}

/// Validate and return Result (for convenience).
///
/// # Errors
///
/// Returns `ConfigValidationError` joining every failed rule.
pub fn validate(config: &DeployConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(DeployError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
