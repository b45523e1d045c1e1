//! Named signer accounts.
//!
//! Accounts are resolved once from configuration and the run variables.
//! An account with no key and no address is kept as unavailable so the error
//! surfaces only when a step actually asks for it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::config::NamedAccountConfig;
use crate::error::{DeployError, Result};
use crate::types::Address;

/// A signer a step can deploy or send from.
#[derive(Clone, PartialEq)]
pub struct Account {
    pub name: String,
    address: Option<Address>,
    private_key: Option<String>,
}

impl Account {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            private_key: None,
        }
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = Some(key.into());
        self
    }

    /// Known public address; `None` until derived from the key.
    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn private_key(&self) -> Option<&str> {
        self.private_key.as_deref()
    }

    pub(crate) fn set_address(&mut self, address: Address) {
        self.address = Some(address);
    }
}

// Keys never reach logs.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("private_key", &self.private_key.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Available(Account),
    Unavailable(String),
}

/// All named accounts for a run.
#[derive(Debug, Clone, Default)]
pub struct NamedAccounts {
    slots: BTreeMap<String, Slot>,
}

impl NamedAccounts {
    /// Resolve configured accounts against the run variables.
    ///
    /// `key_env` is read from `vars`; an account without a usable key or
    /// address takes its fallback's credentials under its own name.
    pub fn resolve(
        configs: &BTreeMap<String, NamedAccountConfig>,
        vars: &HashMap<String, String>,
    ) -> Self {
        let mut slots = BTreeMap::new();

        for name in configs.keys() {
            let slot = Self::resolve_one(name, configs, vars, 0);
            slots.insert(name.clone(), slot);
        }

        Self { slots }
    }

    fn resolve_one(
        name: &str,
        configs: &BTreeMap<String, NamedAccountConfig>,
        vars: &HashMap<String, String>,
        depth: usize,
    ) -> Slot {
        let Some(config) = configs.get(name) else {
            return Slot::Unavailable(format!("account '{}' is not configured", name));
        };
        if depth > configs.len() {
            return Slot::Unavailable("fallback chain loops".to_string());
        }

        let key = config
            .key_env
            .as_ref()
            .and_then(|var| vars.get(var))
            .map(|k| k.trim())
            .filter(|k| !k.is_empty());
        let address = config
            .address
            .as_deref()
            .and_then(|a| Address::parse(a).ok());

        if key.is_some() || address.is_some() {
            let mut account = Account::new(name);
            account.private_key = key.map(String::from);
            account.address = address;
            return Slot::Available(account);
        }

        if let Some(fallback) = &config.fallback {
            return match Self::resolve_one(fallback, configs, vars, depth + 1) {
                Slot::Available(mut account) => {
                    account.name = name.to_string();
                    Slot::Available(account)
                }
                unavailable => unavailable,
            };
        }

        let message = match &config.key_env {
            Some(var) => format!("{} is not set", var),
            None => "no key or address configured".to_string(),
        };
        Slot::Unavailable(message)
    }

    /// Build from ready-made accounts.
    pub fn from_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            slots: accounts
                .into_iter()
                .map(|a| (a.name.clone(), Slot::Available(a)))
                .collect(),
        }
    }

    /// Get an available account.
    pub fn get(&self, name: &str) -> Result<&Account> {
        match self.slots.get(name) {
            Some(Slot::Available(account)) => Ok(account),
            Some(Slot::Unavailable(message)) => Err(DeployError::UnknownAccount {
                name: name.to_string(),
                message: message.clone(),
            }),
            None => Err(DeployError::UnknownAccount {
                name: name.to_string(),
                message: "not configured".to_string(),
            }),
        }
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Account> {
        match self.slots.get_mut(name) {
            Some(Slot::Available(account)) => Some(account),
            _ => None,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn is_available(&self, name: &str) -> bool {
        matches!(self.slots.get(name), Some(Slot::Available(_)))
    }

    /// Fill unavailable accounts with keyless stand-ins.
    ///
    /// Used for dry runs, where the simulated backend derives an address
    /// from the account name.
    pub fn with_placeholders(mut self) -> Self {
        for (name, slot) in self.slots.iter_mut() {
            if let Slot::Unavailable(_) = slot {
                *slot = Slot::Available(Account::new(name.clone()));
            }
        }
        self
    }

    /// Every configured private key, for masking in command output.
    pub fn secrets(&self) -> Vec<String> {
        self.slots
            .values()
            .filter_map(|slot| match slot {
                Slot::Available(account) => account.private_key.clone(),
                Slot::Unavailable(_) => None,
            })
            .collect()
    }
}
