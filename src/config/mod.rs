//! Configuration management for database and application settings.

/// Location and group code tables from config.toml
pub mod codes;

/// Database configuration and connection management
pub mod database;

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// Default balance the capital account is seeded with on first run
pub const DEFAULT_STARTING_CAPITAL: f64 = 0.0;

/// Raw shape of config.toml
#[derive(Debug, Deserialize)]
struct RawConfig {
    /// Balance to seed the capital account with on first run
    #[serde(default)]
    starting_capital: Option<f64>,
    #[serde(flatten)]
    codes: codes::CodesConfig,
}

/// Fully loaded application configuration
#[derive(Debug)]
pub struct AppConfig {
    /// Database URL (env override or default local file)
    pub database_url: String,
    /// Balance to seed the capital account with on first run
    pub starting_capital: f64,
    /// Resolved town/group code tables
    pub codes: codes::CodeTables,
}

/// Loads the application configuration from `config.toml` plus the environment.
///
/// A missing config file is not fatal: the code tables fall back to their
/// defaults and the capital account seed to zero, which keeps first-run
/// behavior sensible on an empty deployment.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = Path::new("config.toml");

    let (starting_capital, codes) = if path.exists() {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("Failed to read config.toml: {e}"),
        })?;
        let raw: RawConfig = toml::from_str(&contents).map_err(|e| Error::Config {
            message: format!("Failed to parse config.toml: {e}"),
        })?;
        info!("Loaded configuration from config.toml");
        (
            raw.starting_capital.unwrap_or(DEFAULT_STARTING_CAPITAL),
            codes::CodeTables::new(&raw.codes),
        )
    } else {
        warn!("config.toml not found, using default code tables");
        (DEFAULT_STARTING_CAPITAL, codes::CodeTables::default())
    };

    Ok(AppConfig {
        database_url: database::get_database_url(),
        starting_capital,
        codes,
    })
}
