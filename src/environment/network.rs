//! Target network metadata, frozen for a run.

use crate::config::{DeployConfig, ExplorerConfig, NetworkConfig};
use crate::error::{DeployError, Result};

/// The network a run deploys to.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkInfo {
    pub name: String,
    pub chain_id: u64,

    /// RPC url template; may still contain `${VAR}` references.
    pub rpc_url: Option<String>,

    pub tags: Vec<String>,
    pub live: bool,
    pub save_deployments: bool,
    pub explorer: Option<ExplorerConfig>,
}

impl NetworkInfo {
    pub fn from_config(name: &str, config: &NetworkConfig) -> Self {
        Self {
            name: name.to_string(),
            chain_id: config.chain_id,
            rpc_url: config.rpc_url.clone(),
            tags: config.tags.clone(),
            live: config.live,
            save_deployments: config.save_deployments,
            explorer: config.verify.clone(),
        }
    }

    /// Look up a configured or built-in network.
    pub fn lookup(config: &DeployConfig, name: &str) -> Result<Self> {
        config
            .network(name)
            .map(|network| Self::from_config(name, &network))
            .ok_or_else(|| DeployError::UnknownNetwork {
                name: name.to_string(),
            })
    }

    /// An in-memory network with the given tags (used by tests and demos).
    pub fn local(name: &str, tags: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            chain_id: 31337,
            rpc_url: Some("http://127.0.0.1:8545".to_string()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            live: false,
            save_deployments: false,
            explorer: None,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn is_mainnet(&self) -> bool {
        self.name == "mainnet"
    }

    pub fn is_localhost(&self) -> bool {
        self.name == "localhost"
    }
}
