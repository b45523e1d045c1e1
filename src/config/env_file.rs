//! `.env` file parsing.
//!
//! Keys such as `DEPLOYER_KEY` and `BATCH_GATEWAY_URLS` are conventionally
//! kept in a `.env` next to the project config.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Parses `.env` files into a map of variables.
///
/// # Supported Formats
///
/// - Simple: `KEY=value`
/// - Quoted: `KEY="value with spaces"` or `KEY='single quoted'`
/// - Exported: `export KEY=value`
/// - Empty: `KEY=`
/// - Comments: `# This is a comment`
/// - Values with equals signs: `URL=https://example.com?foo=bar`
///
/// # Example
///
/// ```
/// use ens_deploy::config::EnvFileParser;
///
/// let content = r#"
/// # Signers
/// DEPLOYER_KEY=0xabc
/// export METADATA_HOST="https://metadata.example"
/// "#;
///
/// let vars = EnvFileParser::parse(content).unwrap();
/// assert_eq!(vars.get("DEPLOYER_KEY"), Some(&"0xabc".to_string()));
/// assert_eq!(vars.get("METADATA_HOST"), Some(&"https://metadata.example".to_string()));
/// ```
pub struct EnvFileParser;

impl EnvFileParser {
    /// Parse env file content into a map of variables.
    pub fn parse(content: &str) -> Result<HashMap<String, String>> {
        let mut vars = HashMap::new();

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = Self::parse_line(line) {
                vars.insert(key, value);
            }
        }

        Ok(vars)
    }

    fn parse_line(line: &str) -> Option<(String, String)> {
        let line = line.strip_prefix("export ").unwrap_or(line);
        let (key, value) = line.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }

        Some((key.to_string(), Self::unquote(value.trim())))
    }

    fn unquote(value: &str) -> String {
        let quoted = value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')));

        if quoted {
            value[1..value.len() - 1].to_string()
        } else {
            value.to_string()
        }
    }

    /// Load and parse an env file.
    pub fn load(path: &Path) -> Result<HashMap<String, String>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content)
    }

    /// Load an env file, returning an empty map if it doesn't exist.
    pub fn load_optional(path: &Path) -> Result<HashMap<String, String>> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(HashMap::new())
        }
    }
}
