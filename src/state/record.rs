//! Persisted deployment record.
//!
//! One JSON file per network under the configured deployments directory,
//! keyed by contract name. Entries are only added or overwritten (on an
//! explicit redeploy), never removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{DeployError, Result};
use crate::types::{Address, ContractArg};

/// Recorded deployments for one network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// Schema version for migration.
    pub version: u32,

    /// Network name this record belongs to.
    pub network: String,

    /// Chain id the deployments were made on.
    pub chain_id: u64,

    /// Contract name → last deployment.
    #[serde(default)]
    pub deployments: BTreeMap<String, DeploymentEntry>,

    /// Step id → completion marker.
    #[serde(default)]
    pub steps: BTreeMap<String, StepCompletion>,

    #[serde(skip)]
    path: Option<PathBuf>,
}

/// A single deployed contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentEntry {
    pub address: Address,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,

    /// Constructor arguments used.
    #[serde(default)]
    pub args: Vec<ContractArg>,

    /// Artifact (contract source) reference.
    pub artifact: String,

    pub deployed_at: DateTime<Utc>,
}

/// Marker that a step ran to completion, wiring included.
///
/// Written only after every deploy and wiring call of the step succeeded.
/// A step that deployed its contracts but failed while wiring them keeps
/// its deployments in the record and is not considered satisfied, so the
/// next run reuses the contracts and retries the wiring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepCompletion {
    pub completed_at: DateTime<Utc>,

    /// Wiring calls made, as `Contract.signature`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wiring: Vec<String>,
}

impl DeploymentRecord {
    /// Current schema version.
    pub const CURRENT_VERSION: u32 = 1;

    /// Create an empty, in-memory record.
    pub fn new(network: impl Into<String>, chain_id: u64) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            network: network.into(),
            chain_id,
            deployments: BTreeMap::new(),
            steps: BTreeMap::new(),
            path: None,
        }
    }

    /// Record file path for a network.
    pub fn path_for(deployments_dir: &Path, network: &str) -> PathBuf {
        deployments_dir.join(format!("{}.json", network))
    }

    /// Load the record at `path`, or start an empty one bound to it.
    ///
    /// A record written for a different chain id is rejected.
    pub fn load(path: &Path, network: &str, chain_id: u64) -> Result<Self> {
        if !path.exists() {
            debug!("No deployment record at {}, starting fresh", path.display());
            return Ok(Self::new(network, chain_id).with_path(path));
        }

        let content = fs::read_to_string(path)?;
        let mut record: Self =
            serde_json::from_str(&content).map_err(|e| DeployError::ConfigParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if record.chain_id != chain_id {
            return Err(DeployError::ConfigValidationError {
                message: format!(
                    "{} was recorded on chain {} but network '{}' is chain {}",
                    path.display(),
                    record.chain_id,
                    network,
                    chain_id
                ),
            });
        }

        record.path = Some(path.to_path_buf());
        Ok(record)
    }

    /// Bind this record to a file.
    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.to_path_buf());
        self
    }

    /// Detach from disk; `save` becomes a no-op.
    pub fn detached(mut self) -> Self {
        self.path = None;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Save to disk using write-to-temp-then-rename.
    ///
    /// Does nothing for records without a path.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, path)?;

        debug!("Saved deployment record to {}", path.display());
        Ok(())
    }

    pub fn get(&self, contract: &str) -> Option<&DeploymentEntry> {
        self.deployments.get(contract)
    }

    /// Insert or overwrite a contract entry.
    pub fn insert(&mut self, contract: impl Into<String>, entry: DeploymentEntry) {
        self.deployments.insert(contract.into(), entry);
    }

    /// Whether every named contract has an entry.
    pub fn contains_all<S: AsRef<str>>(&self, contracts: &[S]) -> bool {
        contracts
            .iter()
            .all(|c| self.deployments.contains_key(c.as_ref()))
    }

    pub fn step(&self, id: &str) -> Option<&StepCompletion> {
        self.steps.get(id)
    }

    /// Whether a step ran to completion, wiring included.
    pub fn is_step_complete(&self, id: &str) -> bool {
        self.steps.contains_key(id)
    }

    pub fn mark_step_complete(&mut self, id: impl Into<String>, wiring: Vec<String>) {
        self.steps.insert(
            id.into(),
            StepCompletion {
                completed_at: Utc::now(),
                wiring,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.deployments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deployments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(addr: &str) -> DeploymentEntry {
        DeploymentEntry {
            address: Address::parse(addr).unwrap(),
            transaction_hash: Some("0xfeed".to_string()),
            args: vec![ContractArg::Uint(21)],
            artifact: "Root".to_string(),
            deployed_at: Utc::now(),
        }
    }

    #[test]
    fn load_missing_file_returns_empty_bound_record() {
        let temp = TempDir::new().unwrap();
        let path = DeploymentRecord::path_for(temp.path(), "blast");

        let record = DeploymentRecord::load(&path, "blast", 81457).unwrap();

        assert!(record.is_empty());
        assert_eq!(record.path(), Some(path.as_path()));
        assert_eq!(record.version, DeploymentRecord::CURRENT_VERSION);
    }

    #[test]
    fn save_then_load_preserves_entries() {
        let temp = TempDir::new().unwrap();
        let path = DeploymentRecord::path_for(temp.path(), "blast");

        let mut record = DeploymentRecord::new("blast", 81457).with_path(&path);
        record.insert("Root", entry("0x0000000000000000000000000000000000000001"));
        record.mark_step_complete("setup-root", vec!["Root.setController(address,bool)".into()]);
        record.save().unwrap();

        let loaded = DeploymentRecord::load(&path, "blast", 81457).unwrap();
        assert_eq!(loaded.deployments, record.deployments);
        assert!(loaded.is_step_complete("setup-root"));
        assert_eq!(
            loaded.step("setup-root").unwrap().wiring,
            vec!["Root.setController(address,bool)"]
        );
        assert!(!temp.path().join("blast.json.tmp").exists());
    }

    #[test]
    fn save_creates_deployments_dir() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("deployments").join("x.json");

        DeploymentRecord::new("x", 1).with_path(&path).save().unwrap();

        assert!(path.exists());
    }

    #[test]
    fn detached_record_does_not_write() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("x.json");

        let record = DeploymentRecord::new("x", 1).with_path(&path).detached();
        record.save().unwrap();

        assert!(!path.exists());
    }

    #[test]
    fn load_rejects_chain_mismatch() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("blast.json");
        DeploymentRecord::new("blast", 81457).with_path(&path).save().unwrap();

        let err = DeploymentRecord::load(&path, "blast", 1).unwrap_err();
        assert!(err.to_string().contains("chain 81457"));
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("blast.json");
        fs::write(&path, "{ not json").unwrap();

        let err = DeploymentRecord::load(&path, "blast", 81457).unwrap_err();
        assert!(matches!(err, DeployError::ConfigParseError { .. }));
    }

    #[test]
    fn contains_all_requires_every_contract() {
        let mut record = DeploymentRecord::new("x", 1);
        record.insert("A", entry("0x0000000000000000000000000000000000000001"));

        assert!(record.contains_all(&["A"]));
        assert!(!record.contains_all(&["A", "B"]));
        assert!(record.contains_all::<&str>(&[]));
    }

    #[test]
    fn deployed_contract_alone_does_not_complete_step() {
        let mut record = DeploymentRecord::new("x", 1);
        record.insert("DNSRegistrar", entry("0x0000000000000000000000000000000000000001"));
        assert!(!record.is_step_complete("dns-registrar"));

        record.mark_step_complete("dns-registrar", Vec::new());
        assert!(record.is_step_complete("dns-registrar"));
        assert!(record.step("dns-registrar").unwrap().wiring.is_empty());
    }

    #[test]
    fn json_layout_is_keyed_by_contract_name() {
        let mut record = DeploymentRecord::new("blast", 81457);
        record.insert("Root", entry("0x0000000000000000000000000000000000000001"));

        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json["deployments"]["Root"]["address"],
            "0x0000000000000000000000000000000000000001"
        );
        assert_eq!(json["deployments"]["Root"]["artifact"], "Root");
        assert!(json.get("path").is_none());
    }
}
