//! Value types passed between steps, the record and the backend.

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::sync::OnceLock;

use crate::error::{DeployError, Result};

fn address_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("static address pattern"))
}

/// A 20-byte account or contract address in `0x`-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and validate an address string.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if address_pattern().is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(DeployError::ConfigValidationError {
                message: format!("'{}' is not a 20-byte hex address", value),
            })
        }
    }

    /// The zero address.
    pub fn zero() -> Self {
        Self(format!("0x{}", "0".repeat(40)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison (checksummed vs lowercase forms).
    pub fn same_as(&self, other: &Address) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = DeployError;

    fn try_from(value: String) -> Result<Self> {
        Address::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

/// A constructor or call argument.
///
/// Integers wider than 64 bits are carried as text in decimal form, the way
/// they are written for the command-line tools that consume them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContractArg {
    Bool(bool),
    Uint(u64),
    Text(String),
    List(Vec<ContractArg>),
}

impl ContractArg {
    /// Render the argument the way `forge`/`cast` expect it on the command line.
    pub fn to_cli(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Uint(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::List(items) => {
                let inner: Vec<String> = items.iter().map(|i| i.to_cli()).collect();
                format!("[{}]", inner.join(","))
            }
        }
    }
}

impl fmt::Display for ContractArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cli())
    }
}

impl From<&Address> for ContractArg {
    fn from(address: &Address) -> Self {
        Self::Text(address.to_string())
    }
}

impl From<Address> for ContractArg {
    fn from(address: Address) -> Self {
        Self::Text(address.0)
    }
}

impl From<&str> for ContractArg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ContractArg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u64> for ContractArg {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<bool> for ContractArg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<ContractArg>> From<Vec<T>> for ContractArg {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Render a list of arguments for display (`[a, b, c]`).
pub fn format_args(args: &[ContractArg]) -> String {
    let parts: Vec<String> = args.iter().map(|a| a.to_cli()).collect();
    format!("[{}]", parts.join(", "))
}

/// Keccak-256 of a single label, `0x`-prefixed.
pub fn labelhash(label: &str) -> String {
    format!("0x{}", hex::encode(Keccak256::digest(label.as_bytes())))
}

/// ENS namehash of a dotted name, `0x`-prefixed.
///
/// The empty name hashes to 32 zero bytes.
pub fn namehash(name: &str) -> String {
    let mut node = [0u8; 32];
    if !name.is_empty() {
        for label in name.rsplit('.') {
            let label_hash = Keccak256::digest(label.as_bytes());
            let mut hasher = Keccak256::new();
            hasher.update(node);
            hasher.update(label_hash);
            node.copy_from_slice(&hasher.finalize());
        }
    }
    format!("0x{}", hex::encode(node))
}
