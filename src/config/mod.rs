//! Configuration loading, parsing, and validation.
//!
//! - Schema definitions and built-in networks in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Deep merging in [`merger`]
//! - Validation in [`validator`]
//! - `${var}` interpolation in [`interpolation`]
//! - `.env` parsing in [`env_file`]
//!
//! # Example
//!
//! ```
//! use ens_deploy::config::{load_merged_config, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".ens-deploy");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "settings:\n  default_network: blast\n").unwrap();
//!
//! let config = load_merged_config(temp.path()).unwrap();
//! validate(&config).unwrap();
//! assert_eq!(config.settings.default_network, "blast");
//! ```

pub mod env_file;
pub mod interpolation;
pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use schema::{
    builtin_networks, BackendConfig, DeployConfig, ExplorerConfig, NamedAccountConfig,
    NetworkConfig, Settings,
};

pub use loader::{
    find_project_root, load_config, load_config_file, load_config_value, load_merged_config,
    parse_config, project_config_path, ConfigPaths, CONFIG_DIR,
};

pub use merger::{deep_merge, merge_configs};

pub use validator::{validate, validate_config, ValidationError};

pub use interpolation::{parse_interpolation, resolve_string, InterpolationContext, Segment};

pub use env_file::EnvFileParser;
