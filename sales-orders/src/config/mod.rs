//! Configuration: defaults, then the TOML file, then environment, then flags

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::records::ReferencePolicy;

/// Directory name under the platform config dir (~/.config/sales-orders/)
pub const APP_DIR: &str = "sales-orders";

/// Database file used when nothing else is configured
pub const DEFAULT_DATABASE: &str = "sales_orders.db";

pub const ENV_DATABASE: &str = "SALES_ORDERS_DB";
pub const ENV_REFERENCE_POLICY: &str = "SALES_ORDERS_REFERENCE_POLICY";
pub const ENV_LOG_LEVEL: &str = "SALES_ORDERS_LOG";

/// Resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite file holding the `sales` and `orders` tables
    pub database_path: PathBuf,
    /// Handling of orders whose sales_id matches no representative
    pub reference_policy: ReferencePolicy,
    /// Default log filter when neither -v nor RUST_LOG is given
    pub log_level: Option<String>,
}

/// On-disk shape of config.toml; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub database_path: Option<PathBuf>,
    pub reference_policy: Option<ReferencePolicy>,
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE),
            reference_policy: ReferencePolicy::default(),
            log_level: None,
        }
    }
}

impl Config {
    /// Platform config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Load configuration
    ///
    /// An explicit `--config` path must exist; the platform default is
    /// optional. `.env` in the working directory is honored.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        ignore_missing_env_file(dotenvy::dotenv().map(|_| ()))?;

        let mut config = Config::default();

        match explicit {
            Some(path) => {
                config.apply_file(read_file(path)?);
            }
            None => {
                if let Some(path) = Self::default_path().filter(|p| p.exists()) {
                    config.apply_file(read_file(&path)?);
                }
            }
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(path) = file.database_path {
            self.database_path = path;
        }
        if let Some(policy) = file.reference_policy {
            self.reference_policy = policy;
        }
        if file.log_level.is_some() {
            self.log_level = file.log_level;
        }
    }

    /// Apply environment overrides read through `var`
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = var(ENV_DATABASE).filter(|v| !v.trim().is_empty()) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(policy) = var(ENV_REFERENCE_POLICY).filter(|v| !v.trim().is_empty()) {
            self.reference_policy = policy
                .parse::<ReferencePolicy>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("Invalid {}", ENV_REFERENCE_POLICY))?;
        }
        if let Some(level) = var(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            self.log_level = Some(level);
        }
        Ok(())
    }

    /// Apply command-line overrides
    pub fn with_overrides(
        mut self,
        database_path: Option<PathBuf>,
        reference_policy: Option<ReferencePolicy>,
    ) -> Self {
        if let Some(path) = database_path {
            self.database_path = path;
        }
        if let Some(policy) = reference_policy {
            self.reference_policy = policy;
        }
        self
    }
}

/// A missing `.env` is the normal case; a malformed one is an error
fn ignore_missing_env_file(result: dotenvy::Result<()>) -> Result<()> {
    match result {
        Err(e) if e.not_found() => Ok(()),
        other => other.context("Failed to load .env"),
    }
}

/// Parse a config.toml
pub fn read_file(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_file(&content).with_context(|| format!("Invalid config file: {}", path.display()))
}

pub fn parse_file(content: &str) -> Result<FileConfig> {
    toml::from_str(content).context("Failed to parse TOML")
}
