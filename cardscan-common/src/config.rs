//! Configuration loading and data directory resolution
//!
//! Two layers:
//! - `ScannerConfig`: the `config.json` rarity allow-list inside the data
//!   directory, written atomically like every other persisted file.
//! - `BootstrapConfig`: optional TOML file that locates the data directory
//!   and sets the default log level.

use crate::store::{read_json, write_json_atomic};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "CARDSCAN_DATA_DIR";

pub const DEFAULT_RARITIES: [&str; 6] = ["Common", "Uncommon", "Rare", "Rare Holo", "Reverse", "Promo"];

fn default_rarities() -> Vec<String> {
    DEFAULT_RARITIES.iter().map(|r| r.to_string()).collect()
}

/// Contents of `config.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Allow-list used when building the catalog
    #[serde(default = "default_rarities")]
    pub rarities: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            rarities: default_rarities(),
        }
    }
}

/// Load `config.json`, falling back to defaults when missing or unreadable
///
/// Fields absent from the file take their default values.
pub fn load_scanner_config(path: &Path) -> ScannerConfig {
    match read_json::<ScannerConfig>(path) {
        Ok(Some(config)) => config,
        Ok(None) => {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            ScannerConfig::default()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read config, using defaults");
            ScannerConfig::default()
        }
    }
}

pub fn save_scanner_config(path: &Path, config: &ScannerConfig) -> Result<()> {
    write_json_atomic(path, config)
}

/// Logging section of the bootstrap TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
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

/// Optional `<config_dir>/cardscan/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BootstrapConfig {
    /// Parse a bootstrap TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load from the platform location; defaults when missing or invalid
    pub fn load_default() -> Self {
        let Some(path) = default_bootstrap_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring invalid bootstrap config");
                Self::default()
            }
        }
    }
}

/// Platform location of the bootstrap TOML file
pub fn default_bootstrap_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cardscan").join("config.toml"))
}

/// Data directory resolution, in priority order:
/// 1. Command-line argument
/// 2. `CARDSCAN_DATA_DIR` environment variable
/// 3. `data_dir` from the bootstrap TOML file
/// 4. Current working directory
#[derive(Debug, Clone, Default)]
pub struct DataDirResolver {
    cli_arg: Option<PathBuf>,
    bootstrap: Option<BootstrapConfig>,
}

impl DataDirResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cli_arg(mut self, cli_arg: Option<PathBuf>) -> Self {
        self.cli_arg = cli_arg;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: BootstrapConfig) -> Self {
        self.bootstrap = Some(bootstrap);
        self
    }

    pub fn resolve(&self) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(DATA_DIR_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        // Priority 3: Bootstrap TOML
        if let Some(path) = self.bootstrap.as_ref().and_then(|b| b.data_dir.clone()) {
            return path;
        }

        // Priority 4: Working directory
        PathBuf::from(".")
    }
}
