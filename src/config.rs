//! CLI configuration file
//!
//! An optional JSON file supplying defaults for flags that were not given on
//! the command line or through the environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://./keystead.db?mode=rwc";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysteadConfig {
    /// Database to connect to when `--database-url` is absent
    #[serde(default)]
    pub database_url: Option<String>,

    /// User to act as when `--actor` is absent
    #[serde(default)]
    pub default_actor: Option<Uuid>,
}

impl KeysteadConfig {
    /// Load the configuration file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let json =
            fs::read_to_string(path).context(format!("Failed to read config file: {:?}", path))?;

        let config: KeysteadConfig = serde_json::from_str(&json)
            .context(format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Flag value, then file value, then the built-in default
    pub fn database_url(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.database_url.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
    }

    /// Flag value, then the file's default actor
    pub fn actor(&self, flag: Option<Uuid>) -> Result<Uuid> {
        flag.or(self.default_actor)
            .context("No actor given: pass --actor or set default_actor in the config file")
    }
}
