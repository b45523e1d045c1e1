//! Configuration schema definitions.
//!
//! This module contains all the struct definitions that map to
//! the YAML configuration file format.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Root configuration structure for `.ens-deploy/config.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Global settings
    pub settings: Settings,

    /// Network definitions, merged over the built-in networks
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub networks: BTreeMap<String, NetworkConfig>,

    /// Named signer accounts
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub named_accounts: BTreeMap<String, NamedAccountConfig>,

    /// External command templates
    pub backend: BackendConfig,
}

impl DeployConfig {
    /// All networks: built-ins overridden by configured entries of the same name.
    pub fn all_networks(&self) -> BTreeMap<String, NetworkConfig> {
        let mut networks = builtin_networks();
        for (name, network) in &self.networks {
            networks.insert(name.clone(), network.clone());
        }
        networks
    }

    /// Look up a single network by name.
    pub fn network(&self, name: &str) -> Option<NetworkConfig> {
        self.networks
            .get(name)
            .cloned()
            .or_else(|| builtin_networks().remove(name))
    }

    /// Named accounts, falling back to `deployer`/`owner` when none are configured.
    pub fn accounts(&self) -> BTreeMap<String, NamedAccountConfig> {
        if self.named_accounts.is_empty() {
            default_named_accounts()
        } else {
            self.named_accounts.clone()
        }
    }
}

/// Global settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory (relative to project root) holding `<network>.json` records
    pub deployments_dir: PathBuf,

    /// Network used when `--network` is not given
    pub default_network: String,

    /// Env file to load before the process environment
    pub env_file: PathBuf,

    /// Top-level domain managed by the base registrar
    pub tld: String,

    /// Extra variables visible to steps
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            deployments_dir: PathBuf::from("deployments"),
            default_network: "localhost".to_string(),
            env_file: PathBuf::from(".env"),
            tld: "blast".to_string(),
            env: HashMap::new(),
        }
    }
}

/// A target network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// EVM chain id
    pub chain_id: u64,

    /// JSON-RPC endpoint (interpolated against the run variables)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,

    /// Tags consulted by step preconditions (`use_root`, `legacy`, `test`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Whether this is a public network holding real value
    #[serde(default, skip_serializing_if = "is_false")]
    pub live: bool,

    /// Persist the deployment record for this network
    #[serde(default = "default_true")]
    pub save_deployments: bool,

    /// Block-explorer verification endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify: Option<ExplorerConfig>,
}

/// Block-explorer (Etherscan-compatible) endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub api_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_url: Option<String>,

    /// API key; explorers that need none accept a placeholder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// A named signer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedAccountConfig {
    /// Variable holding the private key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_env: Option<String>,

    /// Public address, when known ahead of time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Account to use when this one has no key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

/// Argv templates for the external tools.
///
/// Each element is interpolated with `${var}`; constructor/call arguments are
/// appended after `args_flag` (deploy) or directly (send) when non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub deploy: Vec<String>,
    pub args_flag: String,
    pub send: Vec<String>,
    pub verify: Vec<String>,

    /// Prints the address for `${private_key}`
    pub address: Vec<String>,

    /// JSON field holding the deployed address in deploy output
    pub address_field: String,

    /// JSON field holding the transaction hash in deploy/send output
    pub tx_hash_field: String,

    /// Working directory for the commands (relative to project root)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workdir: Option<PathBuf>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        let argv = |parts: &[&str]| parts.iter().map(|s| s.to_string()).collect();
        Self {
            deploy: argv(&[
                "forge",
                "create",
                "${artifact}",
                "--rpc-url",
                "${rpc_url}",
                "--private-key",
                "${private_key}",
                "--broadcast",
                "--json",
            ]),
            args_flag: "--constructor-args".to_string(),
            send: argv(&[
                "cast",
                "send",
                "${address}",
                "${signature}",
                "--rpc-url",
                "${rpc_url}",
                "--private-key",
                "${private_key}",
                "--json",
            ]),
            verify: argv(&[
                "forge",
                "verify-contract",
                "${address}",
                "${artifact}",
                "--chain",
                "${chain_id}",
                "--verifier",
                "etherscan",
                "--verifier-url",
                "${verifier_url}",
                "--etherscan-api-key",
                "${api_key}",
                "--rpc-url",
                "${rpc_url}",
                "--guess-constructor-args",
                "--watch",
            ]),
            address: argv(&["cast", "wallet", "address", "--private-key", "${private_key}"]),
            address_field: "deployedTo".to_string(),
            tx_hash_field: "transactionHash".to_string(),
            workdir: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn is_false(v: &bool) -> bool {
    !v
}

fn default_named_accounts() -> BTreeMap<String, NamedAccountConfig> {
    let mut accounts = BTreeMap::new();
    accounts.insert(
        "deployer".to_string(),
        NamedAccountConfig {
            key_env: Some("DEPLOYER_KEY".to_string()),
            ..Default::default()
        },
    );
    accounts.insert(
        "owner".to_string(),
        NamedAccountConfig {
            key_env: Some("OWNER_KEY".to_string()),
            fallback: Some("deployer".to_string()),
            ..Default::default()
        },
    );
    accounts
}

/// Networks known without any configuration.
pub fn builtin_networks() -> BTreeMap<String, NetworkConfig> {
    let tags = |t: &[&str]| t.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let mut networks = BTreeMap::new();

    networks.insert(
        "hardhat".to_string(),
        NetworkConfig {
            chain_id: 31337,
            rpc_url: Some("http://127.0.0.1:8545".to_string()),
            tags: tags(&["test", "legacy", "use_root"]),
            live: false,
            save_deployments: false,
            verify: None,
        },
    );
    networks.insert(
        "localhost".to_string(),
        NetworkConfig {
            chain_id: 31337,
            rpc_url: Some("http://127.0.0.1:8545".to_string()),
            tags: tags(&["test", "legacy", "use_root"]),
            live: false,
            save_deployments: false,
            verify: None,
        },
    );
    networks.insert(
        "sepolia".to_string(),
        NetworkConfig {
            chain_id: 11155111,
            rpc_url: Some("https://sepolia.infura.io/v3/${INFURA_API_KEY}".to_string()),
            tags: tags(&["test", "legacy", "use_root"]),
            live: true,
            save_deployments: true,
            verify: None,
        },
    );
    networks.insert(
        "mainnet".to_string(),
        NetworkConfig {
            chain_id: 1,
            rpc_url: Some("https://mainnet.infura.io/v3/${INFURA_API_KEY}".to_string()),
            tags: tags(&["legacy", "use_root"]),
            live: true,
            save_deployments: true,
            verify: None,
        },
    );
    networks.insert(
        "blast".to_string(),
        NetworkConfig {
            chain_id: 81457,
            rpc_url: Some("${BLAST_RPC_URL}".to_string()),
            tags: tags(&["legacy", "use_root"]),
            live: true,
            save_deployments: true,
            verify: Some(ExplorerConfig {
                api_url: "https://api.routescan.io/v2/network/mainnet/evm/81457/etherscan"
                    .to_string(),
                browser_url: Some("https://81457.routescan.io".to_string()),
                api_key: Some("blast".to_string()),
            }),
        },
    );
    networks.insert(
        "blast_sepolia".to_string(),
        NetworkConfig {
            chain_id: 168587773,
            rpc_url: Some("${BLAST_SEPOLIA_RPC_URL}".to_string()),
            tags: tags(&["legacy", "use_root"]),
            live: true,
            save_deployments: true,
            verify: Some(ExplorerConfig {
                api_url: "https://api.routescan.io/v2/network/testnet/evm/168587773/etherscan"
                    .to_string(),
                browser_url: Some("https://testnet.blastscan.io".to_string()),
                api_key: Some("blast_sepolia".to_string()),
            }),
        },
    );

    networks
}
