//! secscan configuration
//!
//! Configuration is read from the first file found at:
//! - the path given with `--config`
//! - `./secscan.toml`
//! - `<config dir>/secscan/config.toml` (e.g. `~/.config/secscan/config.toml`)
//!
//! A missing file means defaults; a malformed one is an error.

use crate::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "secscan.toml";

/// secscan configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SecscanConfig {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Rule catalog adjustments
    #[serde(default)]
    pub rules: RulesConfig,

    /// File discovery settings
    #[serde(default)]
    pub scan: ScanConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Rule catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RulesConfig {
    /// Rule ids to drop from the catalog
    #[serde(default)]
    pub disabled: Vec<String>,

    /// Severity overrides keyed by rule id
    #[serde(default)]
    pub severity: BTreeMap<String, String>,

    /// Extra sinks appended to the built-in catalog
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// One user-defined catalog row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SinkConfig {
    /// Fully qualified owning type, e.g. `MyCorp.Vault.Client`
    #[serde(rename = "type")]
    pub type_name: String,

    /// Member name; `.ctor` for constructors, `set_X` for property setters
    pub member: String,

    /// Index of the argument that must not be a literal
    pub parameter: usize,

    pub id: String,

    #[serde(default)]
    pub severity: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

/// File discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ScanConfig {
    /// Glob patterns excluded from directory walks
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Maximum directory depth
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Worker threads; defaults to the number of CPUs
    #[serde(default)]
    pub jobs: Option<usize>,
}

impl SecscanConfig {
    /// Load configuration, honouring an explicit path first
    ///
    /// An explicit path that does not exist is an error; the implicit
    /// locations fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ScanError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            return Self::load_from(path);
        }

        for candidate in Self::search_paths() {
            if candidate.exists() {
                return Self::load_from(&candidate);
            }
        }

        debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Implicit lookup locations, in priority order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("secscan").join("config.toml"));
        }
        paths
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading configuration");
        Self::parse(&content)
    }

    /// Parse configuration text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ScanError::Config {
            message: format!("Failed to parse config: {}", e),
        })
    }
}
