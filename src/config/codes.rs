//! Location and group code tables loaded from config.toml.
//!
//! Loan numbers encode a 3-character town code and a 3-character group code.
//! Both tables are reference data maintained by the office, so they live in
//! the configuration file rather than the database. Lookups for unmapped
//! names fall back to `"000"`.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Code used for towns and groups with no configured mapping
pub const UNMAPPED_CODE: &str = "000";

/// One name-to-code mapping entry in config.toml
#[derive(Debug, Deserialize, Clone)]
pub struct CodeEntry {
    /// Display name as stored on the member record
    pub name: String,
    /// 3-character code embedded in loan numbers
    pub code: String,
}

/// Raw shape of the code sections of config.toml
#[derive(Debug, Deserialize)]
pub struct CodesConfig {
    /// Town-to-code entries
    #[serde(default)]
    pub towns: Vec<CodeEntry>,
    /// Group-to-code entries
    #[serde(default)]
    pub groups: Vec<CodeEntry>,
}

/// Resolved lookup tables for town and group codes
#[derive(Debug, Clone)]
pub struct CodeTables {
    towns: HashMap<String, String>,
    groups: HashMap<String, String>,
}

impl CodeTables {
    /// Builds the tables from parsed config entries.
    #[must_use]
    pub fn new(config: &CodesConfig) -> Self {
        Self {
            towns: config
                .towns
                .iter()
                .map(|e| (e.name.clone(), e.code.clone()))
                .collect(),
            groups: config
                .groups
                .iter()
                .map(|e| (e.name.clone(), e.code.clone()))
                .collect(),
        }
    }

    /// Builds tables directly from (name, code) pairs.
    #[must_use]
    pub fn from_pairs(
        towns: &[(&str, &str)],
        groups: &[(&str, &str)],
    ) -> Self {
        Self {
            towns: towns
                .iter()
                .map(|(n, c)| ((*n).to_string(), (*c).to_string()))
                .collect(),
            groups: groups
                .iter()
                .map(|(n, c)| ((*n).to_string(), (*c).to_string()))
                .collect(),
        }
    }

    /// Resolves a town name to its 3-character code, `"000"` when unmapped
    /// (including a missing town on the member record).
    #[must_use]
    pub fn town_code(&self, town: Option<&str>) -> &str {
        town.and_then(|t| self.towns.get(t))
            .map_or(UNMAPPED_CODE, String::as_str)
    }

    /// Resolves a group name to its 3-character code, `"000"` when unmapped.
    #[must_use]
    pub fn group_code(&self, group: Option<&str>) -> &str {
        group
            .and_then(|g| self.groups.get(g))
            .map_or(UNMAPPED_CODE, String::as_str)
    }
}

impl Default for CodeTables {
    /// The standard three collection groups. Town mappings are office-specific
    /// and come from config.toml.
    fn default() -> Self {
        Self::from_pairs(
            &[],
            &[("Group 1", "001"), ("Group 2", "002"), ("Group 3", "003")],
        )
    }
}

/// Loads the code tables from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_codes<P: AsRef<Path>>(path: P) -> Result<CodeTables> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    let config: CodesConfig = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    Ok(CodeTables::new(&config))
}
