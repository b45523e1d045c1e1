//! The ENS deployment steps, in declaration order.
//!
//! | id | tags | depends on |
//! |----|------|------------|
//! | `registry` | registry, Registry, ENSRegistry | |
//! | `root` | root, Root | ENSRegistry |
//! | `setup-root` | setupRoot | root |
//! | `registrar` | ethregistrar, BaseRegistrarImplementation | registry, root |
//! | `price-oracle` | ethregistrar, ExponentialPremiumPriceOracle, DummyOracle | registry |
//! | `metadata` | wrapper, StaticMetadataService | BaseRegistrarImplementation |
//! | `dnssec-oracle` | dnssec-oracle, DNSSECImpl | |
//! | `offchain-dns-resolver` | OffchainDNSResolver | registry, dnssec-oracle |
//! | `dns-registrar` | DNSRegistrar | registry, dnssec-oracle, OffchainDNSResolver, Root, setupRoot |
//! | `legacy-resolver` | resolvers, LegacyPublicResolver | registry, wrapper |
//! | `eth-owned-resolver` | resolvers, OwnedResolver, EthOwnedResolver | Registry, BaseRegistrarImplementation |
//! | `universal-resolver` | utils, UniversalResolver | registry |

use tracing::{info, warn};

use super::{ActionOutcome, Precondition, Step};
use crate::environment::{DeployOptions, Environment};
use crate::error::{DeployError, Result};
use crate::types::{namehash, Address, ContractArg};

const DEPLOYER: &str = "deployer";
const OWNER: &str = "owner";

/// Chainlink ETH/USD feed used by the price oracle on mainnet.
pub const MAINNET_USD_ORACLE: &str = "0x5f4eC3Df9cbd43714FE2740f5E3616155c5b8419";

const DUMMY_ORACLE_PRICE: u64 = 160_000_000_000;

/// Premium decay curve coefficients for ExponentialPremiumPriceOracle.
const RENT_PRICES: [u64; 5] = [0, 0, 12_683_916_793_505, 5_073_566_717_402, 405_885_337_392];
const START_PREMIUM: &str = "100000000000000000000000000";
const PREMIUM_DURATION_DAYS: u64 = 21;

const DEFAULT_METADATA_HOST: &str = "ens-metadata-service.appspot.com";
const LOCAL_METADATA_HOST: &str = "http://localhost:8080";

pub const LEGACY_RESOLVER_ARTIFACT: &str = "PublicResolver_mainnet_9412610";

/// All ENS steps.
pub fn ens_steps() -> Vec<Step> {
    vec![
        Step::new("registry", deploy_registry)
            .tags(&["registry", "Registry", "ENSRegistry"])
            .produces(&["ENSRegistry"]),
        Step::new("root", deploy_root)
            .tags(&["root", "Root"])
            .depends_on(&["ENSRegistry"])
            .produces(&["Root"])
            .precondition(Precondition::network_tag("use_root")),
        Step::new("setup-root", setup_root)
            .tags(&["setupRoot"])
            .depends_on(&["root"])
            .precondition(Precondition::network_tag("use_root")),
        Step::new("registrar", deploy_base_registrar)
            .tags(&["ethregistrar", "BaseRegistrarImplementation"])
            .depends_on(&["registry", "root"])
            .produces(&["BaseRegistrarImplementation"])
            .precondition(Precondition::network_tag("use_root")),
        Step::new("price-oracle", deploy_price_oracle)
            .tags(&["ethregistrar", "ExponentialPremiumPriceOracle", "DummyOracle"])
            .depends_on(&["registry"])
            .produces(&["ExponentialPremiumPriceOracle"]),
        // Not a real dependency; keeps the metadata service address stable.
        Step::new("metadata", deploy_static_metadata_service)
            .tags(&["wrapper", "StaticMetadataService"])
            .depends_on(&["BaseRegistrarImplementation"])
            .produces(&["StaticMetadataService"]),
        Step::new("dnssec-oracle", deploy_dnssec_oracle)
            .tags(&["dnssec-oracle", "DNSSECImpl"])
            .produces(&["DNSSECImpl"]),
        Step::new("offchain-dns-resolver", deploy_offchain_dns_resolver)
            .tags(&["OffchainDNSResolver"])
            .depends_on(&["registry", "dnssec-oracle"])
            .produces(&["OffchainDNSResolver"]),
        Step::new("dns-registrar", deploy_dns_registrar)
            .tags(&["DNSRegistrar"])
            .depends_on(&[
                "registry",
                "dnssec-oracle",
                "OffchainDNSResolver",
                "Root",
                "setupRoot",
            ])
            .produces(&["TLDPublicSuffixList", "DNSRegistrar"])
            .precondition(Precondition::network_tag("use_root")),
        Step::new("legacy-resolver", deploy_legacy_public_resolver)
            .tags(&["resolvers", "LegacyPublicResolver"])
            .depends_on(&["registry", "wrapper"])
            .produces(&["LegacyPublicResolver"])
            .precondition(Precondition::network_tag("legacy")),
        Step::new("eth-owned-resolver", deploy_eth_owned_resolver)
            .tags(&["resolvers", "OwnedResolver", "EthOwnedResolver"])
            .depends_on(&["Registry", "BaseRegistrarImplementation"])
            .produces(&["OwnedResolver"]),
        Step::new("universal-resolver", deploy_universal_resolver)
            .tags(&["utils", "UniversalResolver"])
            .depends_on(&["registry"])
            .produces(&["UniversalResolver"]),
    ]
}

fn deploy_registry(env: &mut Environment<'_>) -> Result<ActionOutcome> {
    let registry = env.deploy("ENSRegistry", DeployOptions::from(DEPLOYER))?;
    env.verify_if_new("ENSRegistry", &registry);
    Ok(ActionOutcome::Completed)
}

fn deploy_root(env: &mut Environment<'_>) -> Result<ActionOutcome> {
    let registry = env.get("ENSRegistry")?;

    let root = env.deploy(
        "Root",
        DeployOptions::from(DEPLOYER).args(vec![registry.address.into()]),
    )?;
    env.verify_if_new("Root", &root);

    Ok(ActionOutcome::Completed)
}

fn setup_root(env: &mut Environment<'_>) -> Result<ActionOutcome> {
    let root = env.get("Root")?;
    let owner = env.account(OWNER)?;

    env.execute(
        "ENSRegistry",
        DEPLOYER,
        "setOwner(bytes32,address)",
        vec![namehash("").into(), root.address.into()],
    )?;
    env.execute(
        "Root",
        DEPLOYER,
        "transferOwnership(address)",
        vec![(&owner).into()],
    )?;
    env.execute(
        "Root",
        OWNER,
        "setController(address,bool)",
        vec![owner.into(), true.into()],
    )?;

    Ok(ActionOutcome::Completed)
}

fn deploy_base_registrar(env: &mut Environment<'_>) -> Result<ActionOutcome> {
    let registry = env.get("ENSRegistry")?;
    let args = vec![registry.address.into(), env.tld_node().into()];

    let registrar = env.deploy(
        "BaseRegistrarImplementation",
        DeployOptions::from(DEPLOYER).args(args),
    )?;
    env.verify_if_new("BaseRegistrarImplementation", &registrar);

    Ok(ActionOutcome::Completed)
}

fn deploy_price_oracle(env: &mut Environment<'_>) -> Result<ActionOutcome> {
    let usd_oracle = if env.network().is_mainnet() {
        Address::parse(MAINNET_USD_ORACLE)?
    } else {
        env.deploy(
            "DummyOracle",
            DeployOptions::from(DEPLOYER).args(vec![DUMMY_ORACLE_PRICE.into()]),
        )?
        .address
    };

    let args = vec![
        usd_oracle.into(),
        RENT_PRICES.to_vec().into(),
        START_PREMIUM.into(),
        PREMIUM_DURATION_DAYS.into(),
    ];
    let oracle = env.deploy(
        "ExponentialPremiumPriceOracle",
        DeployOptions::from(DEPLOYER).args(args),
    )?;
    env.verify_if_new("ExponentialPremiumPriceOracle", &oracle);

    Ok(ActionOutcome::Completed)
}

/// Token metadata url template served by the metadata service.
pub fn metadata_url(env: &Environment<'_>) -> String {
    let host = if env.network().is_localhost() {
        LOCAL_METADATA_HOST
    } else {
        env.var("METADATA_HOST").unwrap_or(DEFAULT_METADATA_HOST)
    };
    format!("{}/name/0x{{id}}", host)
}

fn deploy_static_metadata_service(env: &mut Environment<'_>) -> Result<ActionOutcome> {
    let url = metadata_url(env);

    let metadata = env.deploy(
        "StaticMetadataService",
        DeployOptions::from(DEPLOYER).args(vec![url.into()]),
    )?;
    env.verify_if_new("StaticMetadataService", &metadata);

    Ok(ActionOutcome::Completed)
}

fn deploy_dnssec_oracle(env: &mut Environment<'_>) -> Result<ActionOutcome> {
    let anchors = env.require_var("DNSSEC_ANCHORS")?.to_string();

    let dnssec = env.deploy(
        "DNSSECImpl",
        DeployOptions::from(DEPLOYER).args(vec![anchors.into()]),
    )?;
    env.verify_if_new("DNSSECImpl", &dnssec);

    Ok(ActionOutcome::Completed)
}

fn deploy_offchain_dns_resolver(env: &mut Environment<'_>) -> Result<ActionOutcome> {
    let registry = env.get("ENSRegistry")?;
    let dnssec = env.get("DNSSECImpl")?;
    let gateway = env.require_var("OFFCHAIN_DNS_GATEWAY")?.to_string();

    let resolver = env.deploy(
        "OffchainDNSResolver",
        DeployOptions::from(DEPLOYER).args(vec![
            registry.address.into(),
            dnssec.address.into(),
            gateway.into(),
        ]),
    )?;
    env.verify_if_new("OffchainDNSResolver", &resolver);

    Ok(ActionOutcome::Completed)
}

fn deploy_dns_registrar(env: &mut Environment<'_>) -> Result<ActionOutcome> {
    let registry = env.get("ENSRegistry")?;
    let dnssec = env.get("DNSSECImpl")?;
    let resolver = env.get("OffchainDNSResolver")?;
    env.get("Root")?;

    // A forced redeploy points the new registrar at the one it replaces.
    let previous = if env.is_forced() {
        env.get_or_null("DNSRegistrar").map(|r| r.address)
    } else {
        None
    };

    let suffixes = env.deploy("TLDPublicSuffixList", DeployOptions::from(DEPLOYER))?;

    let registrar = env.deploy(
        "DNSRegistrar",
        DeployOptions::from(DEPLOYER).args(vec![
            previous.unwrap_or_else(Address::zero).into(),
            resolver.address.into(),
            dnssec.address.into(),
            (&suffixes.address).into(),
            registry.address.into(),
        ]),
    )?;
    info!("Deployed DNSRegistrar to {}", registrar.address);

    env.execute(
        "Root",
        OWNER,
        "setController(address,bool)",
        vec![(&registrar.address).into(), true.into()],
    )?;

    env.verify_if_new("DNSRegistrar", &registrar);
    env.verify_if_new("TLDPublicSuffixList", &suffixes);

    Ok(ActionOutcome::Completed)
}

fn deploy_legacy_public_resolver(env: &mut Environment<'_>) -> Result<ActionOutcome> {
    let registry = env.get("ENSRegistry")?;

    // Built from a pinned mainnet artifact; not submitted for verification.
    env.deploy(
        "LegacyPublicResolver",
        DeployOptions::from(DEPLOYER)
            .args(vec![registry.address.into()])
            .artifact(LEGACY_RESOLVER_ARTIFACT),
    )?;

    Ok(ActionOutcome::Completed)
}

fn deploy_eth_owned_resolver(env: &mut Environment<'_>) -> Result<ActionOutcome> {
    let resolver = env.deploy("OwnedResolver", DeployOptions::from(DEPLOYER))?;
    env.verify_if_new("OwnedResolver", &resolver);

    if env.get_or_null("BaseRegistrarImplementation").is_none() {
        warn!(
            "No BaseRegistrarImplementation on {}; resolver for .{} left unset",
            env.network().name,
            env.tld()
        );
        return Ok(ActionOutcome::Completed);
    }

    env.execute(
        "BaseRegistrarImplementation",
        OWNER,
        "setResolver(address)",
        vec![(&resolver.address).into()],
    )?;
    info!("Set resolver for .{} to {}", env.tld(), resolver.address);

    Ok(ActionOutcome::Completed)
}

/// Parse `BATCH_GATEWAY_URLS`, a JSON array of gateway urls.
pub fn batch_gateway_urls(env: &Environment<'_>) -> Result<Vec<String>> {
    let raw = env.var("BATCH_GATEWAY_URLS").unwrap_or("[]");
    let urls: Vec<String> =
        serde_json::from_str(raw).map_err(|e| DeployError::ConfigValidationError {
            message: format!("BATCH_GATEWAY_URLS must be a JSON array of urls: {}", e),
        })?;

    if urls.is_empty() {
        return Err(DeployError::MissingSetting {
            step: env.step().to_string(),
            key: "BATCH_GATEWAY_URLS".to_string(),
        });
    }
    Ok(urls)
}

fn deploy_universal_resolver(env: &mut Environment<'_>) -> Result<ActionOutcome> {
    let registry = env.get("ENSRegistry")?;
    let urls = batch_gateway_urls(env)?;

    let resolver = env.deploy(
        "UniversalResolver",
        DeployOptions::from(DEPLOYER).args(vec![
            registry.address.into(),
            ContractArg::from(urls),
        ]),
    )?;
    env.verify_if_new("UniversalResolver", &resolver);

    Ok(ActionOutcome::Completed)
}
