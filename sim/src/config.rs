//! Simulator configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use staking_ledger::LedgerConfig;
use staking_utils::LogFormat;

use crate::error::SimError;

/// Configuration for a simulator run.
///
/// Loaded from a TOML file via [`SimConfig::from_toml_file`] or built
/// programmatically (e.g. for tests). CLI flags override file values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Unix time the scenario's `at = 0` maps to.
    #[serde(default)]
    pub start_time: u64,

    /// Ledger construction parameters.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl SimConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, SimError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, SimError> {
        toml::from_str(s).map_err(|e| SimError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, SimError> {
        toml::to_string_pretty(self).map_err(|e| SimError::Config(e.to_string()))
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            start_time: 0,
            ledger: LedgerConfig::default(),
        }
    }
}
