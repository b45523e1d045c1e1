//! Everything a step can see while it runs.
//!
//! A [`RunContext`] is resolved once per run: the target network, the named
//! accounts and the frozen variable set. Each step then gets an
//! [`Environment`] over it, the record and the backends.
//!
//! Variables are layered, later layers winning:
//!
//! 1. `settings.env` from the configuration
//! 2. The project's `.env` file
//! 3. The process environment

pub mod accounts;
pub mod context;
pub mod network;

pub use accounts::{Account, NamedAccounts};
pub use context::{
    DeployOptions, DeployResult, DeployedContract, Environment, StepEffects, StepOptions,
};
pub use network::NetworkInfo;

use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::config::{DeployConfig, EnvFileParser};
use crate::error::Result;

/// Network, accounts and variables, frozen for one run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub network: NetworkInfo,
    pub accounts: NamedAccounts,
    pub vars: HashMap<String, String>,
    /// Top-level domain the registrar manages.
    pub tld: String,
}

impl RunContext {
    /// A context with no accounts and no variables.
    pub fn new(network: NetworkInfo) -> Self {
        Self {
            network,
            accounts: NamedAccounts::default(),
            vars: HashMap::new(),
            tld: "blast".to_string(),
        }
    }

    pub fn with_accounts(mut self, accounts: NamedAccounts) -> Self {
        self.accounts = accounts;
        self
    }

    pub fn with_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.vars = vars;
        self
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_tld(mut self, tld: impl Into<String>) -> Self {
        self.tld = tld.into();
        self
    }

    /// Resolve the context for `network` from configuration.
    ///
    /// # Errors
    ///
    /// `UnknownNetwork` when the network is neither configured nor built in,
    /// or an error reading the `.env` file.
    pub fn from_config(config: &DeployConfig, network: &str, project_root: &Path) -> Result<Self> {
        let network = NetworkInfo::lookup(config, network)?;
        let vars = load_vars(config, project_root, std::env::vars())?;
        let accounts = NamedAccounts::resolve(&config.accounts(), &vars);

        debug!(
            "Run context: network {} (chain {}), accounts {:?}",
            network.name,
            network.chain_id,
            accounts.names().collect::<Vec<_>>()
        );

        Ok(Self {
            network,
            accounts,
            vars,
            tld: config.settings.tld.clone(),
        })
    }
}

/// Build the variable set: config `env`, then `.env`, then `process`.
pub fn load_vars(
    config: &DeployConfig,
    project_root: &Path,
    process: impl IntoIterator<Item = (String, String)>,
) -> Result<HashMap<String, String>> {
    let mut vars = config.settings.env.clone();

    let env_path = project_root.join(&config.settings.env_file);
    let from_file = EnvFileParser::load_optional(&env_path)?;
    if !from_file.is_empty() {
        debug!("Loaded {} variables from {}", from_file.len(), env_path.display());
    }
    vars.extend(from_file);
    vars.extend(process);

    Ok(vars)
}
