//! In-memory backend for dry runs and tests.
//!
//! Addresses and transaction hashes are derived from a SHA-256 of the chain,
//! sender, nonce and contract, so a run is reproducible from a fresh backend.

use sha2::{Digest, Sha256};
use std::collections::HashSet;

use super::{DeployBackend, DeployReceipt, DeployRequest, SendRequest, Verifier, VerifyRequest};
use crate::environment::{Account, NetworkInfo};
use crate::error::{DeployError, Result, VerificationError};
use crate::types::{Address, ContractArg};

/// A recorded contract creation.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployCall {
    pub contract: String,
    pub artifact: String,
    pub from: String,
    pub args: Vec<ContractArg>,
}

/// A recorded wiring transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct SendCall {
    pub contract: String,
    pub address: Address,
    pub from: String,
    pub signature: String,
    pub args: Vec<ContractArg>,
}

/// Deterministic backend that records every call it receives.
#[derive(Debug, Default)]
pub struct SimulatedBackend {
    nonce: u64,
    deploys: Vec<DeployCall>,
    sends: Vec<SendCall>,
    fail_deploys: HashSet<String>,
    fail_sends: HashSet<String>,
}

fn hash_hex(input: &str) -> String {
    let hash = Sha256::digest(input.as_bytes());
    hex::encode(&hash[..])
}

fn derive_address(seed: &str) -> Address {
    // Last 20 of the 32 digest bytes, as for contract addresses.
    let hash = Sha256::digest(seed.as_bytes());
    Address::parse(&format!("0x{}", hex::encode(&hash[12..]))).unwrap_or_else(|_| Address::zero())
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make deployments of `contract` fail with a transaction error.
    pub fn fail_deploy_of(mut self, contract: impl Into<String>) -> Self {
        self.fail_deploys.insert(contract.into());
        self
    }

    /// Make calls to `signature` fail with a transaction error.
    pub fn fail_send_of(mut self, signature: impl Into<String>) -> Self {
        self.fail_sends.insert(signature.into());
        self
    }

    pub fn deploys(&self) -> &[DeployCall] {
        &self.deploys
    }

    pub fn sends(&self) -> &[SendCall] {
        &self.sends
    }

    pub fn deploy_count(&self) -> usize {
        self.deploys.len()
    }

    fn next_nonce(&mut self) -> u64 {
        self.nonce += 1;
        self.nonce
    }
}

impl DeployBackend for SimulatedBackend {
    fn deploy(
        &mut self,
        network: &NetworkInfo,
        request: &DeployRequest<'_>,
    ) -> Result<DeployReceipt> {
        if self.fail_deploys.contains(request.contract) {
            return Err(DeployError::DeployTransaction {
                contract: request.contract.to_string(),
                message: "simulated transaction failure".to_string(),
            });
        }

        let nonce = self.next_nonce();
        let seed = format!(
            "{}:{}:{}:{}",
            network.chain_id, request.from.name, nonce, request.contract
        );

        self.deploys.push(DeployCall {
            contract: request.contract.to_string(),
            artifact: request.artifact.to_string(),
            from: request.from.name.clone(),
            args: request.args.to_vec(),
        });

        Ok(DeployReceipt {
            address: derive_address(&seed),
            transaction_hash: Some(format!("0x{}", hash_hex(&format!("tx:{}", seed)))),
        })
    }

    fn send(&mut self, network: &NetworkInfo, request: &SendRequest<'_>) -> Result<Option<String>> {
        if self.fail_sends.contains(request.signature) {
            return Err(DeployError::DeployTransaction {
                contract: request.contract.to_string(),
                message: format!("{} reverted (simulated)", request.signature),
            });
        }

        let nonce = self.next_nonce();
        self.sends.push(SendCall {
            contract: request.contract.to_string(),
            address: request.address.clone(),
            from: request.from.name.clone(),
            signature: request.signature.to_string(),
            args: request.args.to_vec(),
        });

        let seed = format!(
            "tx:{}:{}:{}:{}",
            network.chain_id, request.from.name, nonce, request.signature
        );
        Ok(Some(format!("0x{}", hash_hex(&seed))))
    }

    fn account_address(&mut self, account: &Account) -> Result<Address> {
        match account.address() {
            Some(address) => Ok(address.clone()),
            None => {
                let key = account.private_key().unwrap_or(account.name.as_str());
                Ok(derive_address(&format!("account:{}", key)))
            }
        }
    }
}

/// Verifier that accepts everything except configured contracts.
#[derive(Debug, Default)]
pub struct SimulatedVerifier {
    failing: HashSet<String>,
    fail_all: bool,
    submitted: Vec<String>,
}

impl SimulatedVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every submission.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    pub fn fail_for(mut self, contract: impl Into<String>) -> Self {
        self.failing.insert(contract.into());
        self
    }

    /// Contracts submitted so far, in order.
    pub fn submitted(&self) -> &[String] {
        &self.submitted
    }
}

impl Verifier for SimulatedVerifier {
    fn verify(
        &mut self,
        _network: &NetworkInfo,
        request: &VerifyRequest<'_>,
    ) -> std::result::Result<(), VerificationError> {
        self.submitted.push(request.contract.to_string());

        if self.fail_all || self.failing.contains(request.contract) {
            return Err(VerificationError {
                contract: request.contract.to_string(),
                address: request.address.to_string(),
                message: "explorer rejected the submission (simulated)".to_string(),
            });
        }
        Ok(())
    }
}
