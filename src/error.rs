//! Error types for deployment operations.
//!
//! This module defines [`DeployError`], the primary error type used throughout
//! the pipeline, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Resolver errors (`CircularDependency`, `UnknownDependency`) abort before any step runs
//! - `UnresolvedDependency` means a step read an address the resolver should have ordered first
//! - `DeployTransaction` aborts the pipeline at the failing step
//! - [`VerificationError`] is a separate type with no conversion into `DeployError`;
//!   verification is best-effort and must never abort a run

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for deployment operations.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse a configuration or record file.
    #[error("Failed to parse {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// The requested network is not configured.
    #[error("Unknown network: {name}")]
    UnknownNetwork { name: String },

    /// A step asked for a named account that is not configured or has no key.
    #[error("Account '{name}' is not available: {message}")]
    UnknownAccount { name: String, message: String },

    /// Step dependency cycle detected.
    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// A step (or run filter) references an id or tag no step carries.
    #[error("'{step}' references unknown step or tag '{dependency}'")]
    UnknownDependency { step: String, dependency: String },

    /// A step looked up a contract that has not been deployed.
    #[error("Contract '{contract}' has no recorded deployment (needed by step '{step}')")]
    UnresolvedDependency { step: String, contract: String },

    /// A step needs a setting (environment variable) that is not set.
    #[error("Step '{step}' requires {key} to be set")]
    MissingSetting { step: String, key: String },

    /// Submitting or confirming a deployment or wiring transaction failed.
    #[error("Transaction for '{contract}' failed: {message}")]
    DeployTransaction { contract: String, message: String },

    /// External command failed to start or exited unsuccessfully.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error wrapper.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for deployment operations.
pub type Result<T> = std::result::Result<T, DeployError>;

/// A failed block-explorer verification.
///
/// Deliberately not convertible into [`DeployError`].
#[derive(Debug, Clone, Error)]
#[error("Verification of {contract} at {address} failed: {message}")]
pub struct VerificationError {
    pub contract: String,
    pub address: String,
    pub message: String,
}
