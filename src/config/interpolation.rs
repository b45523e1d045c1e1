//! `${variable}` interpolation for network urls and backend argv templates.
//!
//! # Syntax
//!
//! - `${variable_name}` - replaced with the variable's value
//! - `$${escaped}` - produces a literal `${escaped}`
//!
//! # Example
//!
//! ```yaml
//! rpc_url: "https://mainnet.infura.io/v3/${INFURA_API_KEY}"
//! ```

use crate::error::{DeployError, Result};
use std::collections::HashMap;

/// A segment of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Variable(String),
}

/// Split a string into literal and `${var}` segments.
pub fn parse_interpolation(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut chars = input.chars().peekable();
    let mut literal = String::new();

    while let Some(c) = chars.next() {
        if c != '$' {
            literal.push(c);
            continue;
        }

        match chars.peek() {
            Some('$') => {
                chars.next();
                if chars.peek() == Some(&'{') {
                    // $${...} is copied through verbatim, minus one '$'
                    chars.next();
                    literal.push_str("${");
                    for c in chars.by_ref() {
                        literal.push(c);
                        if c == '}' {
                            break;
                        }
                    }
                } else {
                    literal.push('$');
                }
            }
            Some('{') => {
                chars.next();
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }

                let name: String = chars.by_ref().take_while(|&c| c != '}').collect();
                segments.push(Segment::Variable(name));
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    segments
}

/// Context for variable resolution.
///
/// Variables are resolved in priority order:
/// 1. Per-invocation values (`address`, `artifact`, `private_key`, ...)
/// 2. Environment (process env over `.env` over `settings.env`)
/// 3. Built-ins (`network`, `chain_id`, `ens_deploy_version`)
#[derive(Debug, Clone, Default)]
pub struct InterpolationContext {
    pub call: HashMap<String, String>,
    pub env: HashMap<String, String>,
    pub builtins: HashMap<String, String>,
}

impl InterpolationContext {
    /// Create a context holding only the version built-in.
    pub fn new() -> Self {
        let mut builtins = HashMap::new();
        builtins.insert(
            "ens_deploy_version".to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );

        Self {
            builtins,
            ..Default::default()
        }
    }

    /// Add network built-ins.
    pub fn with_network(mut self, name: &str, chain_id: u64) -> Self {
        self.builtins.insert("network".to_string(), name.to_string());
        self.builtins
            .insert("chain_id".to_string(), chain_id.to_string());
        self
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Set a per-invocation variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.call.insert(name.into(), value.into());
        self
    }

    /// Resolution order: call > env > builtins
    pub fn resolve(&self, name: &str) -> Option<String> {
        self.call
            .get(name)
            .or_else(|| self.env.get(name))
            .or_else(|| self.builtins.get(name))
            .cloned()
    }
}

/// Resolve every variable in `input`.
///
/// # Errors
///
/// Returns `ConfigValidationError` naming the first unresolved variable.
pub fn resolve_string(input: &str, context: &InterpolationContext) -> Result<String> {
    let mut result = String::new();

    for segment in parse_interpolation(input) {
        match segment {
            Segment::Literal(text) => result.push_str(&text),
            Segment::Variable(name) => {
                let value =
                    context
                        .resolve(&name)
                        .ok_or_else(|| DeployError::ConfigValidationError {
                            message: format!("Unresolved variable: ${{{}}}", name),
                        })?;
                result.push_str(&value);
            }
        }
    }

    Ok(result)
}
