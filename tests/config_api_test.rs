//! Integration tests for config module public API.

use ens_deploy::config::{
    load_config, load_merged_config, resolve_string, validate, validate_config, DeployConfig,
    InterpolationContext,
};
use ens_deploy::environment::RunContext;
use ens_deploy::DeployError;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_config(root: &Path, name: &str, content: &str) {
    let dir = root.join(".ens-deploy");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn public_api_is_accessible() {
    let _config = DeployConfig::default();
    let _ctx = InterpolationContext::new();
}

#[test]
fn full_config_workflow() {
    let temp = TempDir::new().unwrap();
    write_config(
        temp.path(),
        "config.yml",
        r#"
settings:
  default_network: blast-testnet
networks:
  blast-testnet:
    chain_id: 168587773
    rpc_url: "https://sepolia.blast.io/${RPC_KEY}"
    tags: [use_root]
"#,
    );

    let config = load_merged_config(temp.path()).unwrap();
    validate(&config).unwrap();

    let rpc = config.network("blast-testnet").unwrap().rpc_url.unwrap();
    let mut ctx = InterpolationContext::new().with_network("blast-testnet", 168587773);
    ctx.set("RPC_KEY", "abc");

    assert_eq!(
        resolve_string(&rpc, &ctx).unwrap(),
        "https://sepolia.blast.io/abc"
    );
}

#[test]
fn local_config_overrides_project_config() {
    let temp = TempDir::new().unwrap();
    write_config(
        temp.path(),
        "config.yml",
        r#"
settings:
  default_network: devnet
networks:
  devnet:
    chain_id: 1337
    rpc_url: http://127.0.0.1:8545
"#,
    );
    write_config(
        temp.path(),
        "config.local.yml",
        r#"
networks:
  devnet:
    rpc_url: http://10.0.0.5:8545
"#,
    );

    let config = load_merged_config(temp.path()).unwrap();
    let devnet = config.network("devnet").unwrap();

    assert_eq!(devnet.chain_id, 1337);
    assert_eq!(devnet.rpc_url.as_deref(), Some("http://10.0.0.5:8545"));
}

#[test]
fn missing_config_is_reported_with_its_path() {
    let temp = TempDir::new().unwrap();

    let err = load_config(temp.path(), None).unwrap_err();
    assert!(matches!(err, DeployError::ConfigNotFound { .. }));
}

#[test]
fn validation_collects_every_problem() {
    let temp = TempDir::new().unwrap();
    write_config(
        temp.path(),
        "config.yml",
        r#"
settings:
  default_network: nowhere
networks:
  broken:
    chain_id: 0
"#,
    );

    let config = load_merged_config(temp.path()).unwrap();
    let errors = validate_config(&config);
    let rules: Vec<&str> = errors.iter().map(|e| e.rule.as_str()).collect();

    assert!(rules.contains(&"unknown-default-network"));
    assert!(rules.contains(&"missing-chain-id"));
    assert!(rules.contains(&"missing-rpc-url"));
    assert!(validate(&config).is_err());
}

#[test]
fn run_context_layers_dotenv_over_settings() {
    let temp = TempDir::new().unwrap();
    write_config(
        temp.path(),
        "config.yml",
        r#"
settings:
  default_network: localhost
  env:
    OWNER_KEY: from-settings
    METADATA_HOST: ens.example
"#,
    );
    fs::write(temp.path().join(".env"), "OWNER_KEY=from-dotenv\n").unwrap();

    let config = load_merged_config(temp.path()).unwrap();
    let context = RunContext::from_config(&config, "localhost", temp.path()).unwrap();

    assert_eq!(context.network.chain_id, 31337);
    assert_eq!(context.vars["OWNER_KEY"], "from-dotenv");
    assert_eq!(context.vars["METADATA_HOST"], "ens.example");
}

#[test]
fn unknown_network_is_an_error() {
    let config = DeployConfig::default();
    let temp = TempDir::new().unwrap();

    let err = RunContext::from_config(&config, "nowhere", temp.path()).unwrap_err();
    assert!(matches!(err, DeployError::UnknownNetwork { .. }));
}
