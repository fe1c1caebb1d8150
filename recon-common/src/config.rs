//! Configuration file resolution and bootstrap settings
//!
//! Config file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Per-user config file (`<config_dir>/recon/config.toml`)
//! 4. System config file (`/etc/recon/config.toml`, Linux only)
//!
//! When none of these exist the caller falls back to compiled defaults.
//! A missing config file is never fatal; a malformed one is.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "RECON_CONFIG";

/// Application directory name under the platform config dir
const APP_DIR: &str = "recon";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP client settings applied to every remote call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpSettings {
    /// Per-request timeout as a `Duration`
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "recon/0.1.0".to_string()
}

/// Resolve which config file to read
///
/// Returns `None` when no candidate exists; callers then use compiled defaults.
/// An explicit CLI or environment path is returned even if it does not exist,
/// so the loader can report it.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3/4: platform locations
    default_config_candidates()
        .into_iter()
        .find(|candidate| candidate.exists())
}

/// Platform config file locations, most specific first
pub fn default_config_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join(APP_DIR).join("config.toml"));
    }

    if cfg!(target_os = "linux") {
        candidates.push(PathBuf::from("/etc").join(APP_DIR).join("config.toml"));
    }

    candidates
}

/// Read and parse a TOML file
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|source| Error::TomlParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load configuration with graceful degradation
///
/// - `None` path: compiled defaults, logged at info
/// - Path that does not exist: warning + compiled defaults
/// - Path that exists but fails to parse: error (never silently ignored)
pub fn load_or_default<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        None => {
            info!("No config file found, using built-in defaults");
            Ok(T::default())
        }
        Some(path) if !path.exists() => {
            warn!(
                "Config file {} not found, using built-in defaults",
                path.display()
            );
            Ok(T::default())
        }
        Some(path) => {
            let config = load_toml(path)?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
    }
}

/// Write a config value to a TOML file
///
/// Writes to a sibling temp file first and renames it into place, so a
/// crash never leaves a half-written config behind.
pub fn write_toml_config<T: Serialize>(config: &T, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;

    Ok(())
}
