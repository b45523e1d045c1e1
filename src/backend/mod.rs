//! External deployment and verification backends.
//!
//! The pipeline never talks to a chain directly. Contract creation and
//! wiring calls go through a [`DeployBackend`], source verification through
//! a [`Verifier`]:
//!
//! - [`CommandBackend`] / [`CommandVerifier`] shell out to `forge`/`cast`
//! - [`SimulatedBackend`] / [`SimulatedVerifier`] derive deterministic results
//!   in memory (dry runs and tests)

pub mod command;
pub mod simulated;
pub mod verify;

use crate::environment::{Account, NetworkInfo};
use crate::error::{Result, VerificationError};
use crate::types::{Address, ContractArg};

pub use command::CommandBackend;
pub use simulated::{DeployCall, SendCall, SimulatedBackend, SimulatedVerifier};
pub use verify::{verify_recorded, CommandVerifier, VerifyOutcome};

/// A contract creation.
#[derive(Debug, Clone, Copy)]
pub struct DeployRequest<'a> {
    /// Name the deployment is recorded under.
    pub contract: &'a str,
    /// Artifact to compile/deploy (usually equal to `contract`).
    pub artifact: &'a str,
    pub from: &'a Account,
    pub args: &'a [ContractArg],
}

/// A confirmed contract creation.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployReceipt {
    pub address: Address,
    pub transaction_hash: Option<String>,
}

/// A state-changing call on a deployed contract.
#[derive(Debug, Clone, Copy)]
pub struct SendRequest<'a> {
    pub contract: &'a str,
    pub address: &'a Address,
    pub from: &'a Account,
    /// Solidity signature, e.g. `setController(address,bool)`.
    pub signature: &'a str,
    pub args: &'a [ContractArg],
}

/// A source verification submission.
#[derive(Debug, Clone, Copy)]
pub struct VerifyRequest<'a> {
    pub contract: &'a str,
    pub artifact: &'a str,
    pub address: &'a Address,
    pub args: &'a [ContractArg],
}

/// Submits transactions and blocks until they are confirmed.
pub trait DeployBackend {
    /// Deploy a contract.
    ///
    /// Submission or confirmation failures are `DeployTransaction` errors.
    fn deploy(&mut self, network: &NetworkInfo, request: &DeployRequest<'_>)
        -> Result<DeployReceipt>;

    /// Send a transaction to a deployed contract; returns its hash when known.
    fn send(&mut self, network: &NetworkInfo, request: &SendRequest<'_>)
        -> Result<Option<String>>;

    /// Derive the public address of an account that only has a key.
    fn account_address(&mut self, account: &Account) -> Result<Address>;
}

/// Submits contract sources to a block explorer.
///
/// Errors are a [`VerificationError`], which has no conversion into the
/// pipeline's error type.
pub trait Verifier {
    fn verify(
        &mut self,
        network: &NetworkInfo,
        request: &VerifyRequest<'_>,
    ) -> std::result::Result<(), VerificationError>;
}
