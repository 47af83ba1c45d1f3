//! Configuration loading and root folder resolution
//!
//! Missing or malformed configuration never aborts startup: the loader logs a
//! warning and falls back to compiled defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "PYMK_ROOT_FOLDER";

/// Environment variable pointing at an explicit TOML config file
pub const CONFIG_FILE_ENV: &str = "PYMK_CONFIG";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "pymk.db";

/// Contents of the TOML configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database
    pub root_folder: Option<PathBuf>,

    /// HTTP service settings
    #[serde(default)]
    pub service: ServiceConfig,
}

/// HTTP service settings (`[service]` table)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Bind address
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Result count used when the caller does not ask for one
    pub default_limit: usize,
    /// Upper bound applied to any requested result count
    pub max_limit: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5760,
            default_limit: 10,
            max_limit: 50,
        }
    }
}

impl ServiceConfig {
    /// Check internal consistency of the limits
    pub fn validate(&self) -> Result<()> {
        if self.max_limit == 0 {
            return Err(Error::Config("max_limit must be at least 1".to_string()));
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(Error::Config(format!(
                "default_limit must be within 1..={} (got {})",
                self.max_limit, self.default_limit
            )));
        }
        Ok(())
    }
}

/// Parse TOML configuration text
pub fn parse_toml_config(text: &str) -> Result<TomlConfig> {
    let config: TomlConfig =
        toml::from_str(text).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
    config.service.validate()?;
    Ok(config)
}

/// Load the TOML configuration file, falling back to defaults
///
/// Lookup order: `PYMK_CONFIG`, then `~/.config/pymk/config.toml`, then
/// `/etc/pymk/config.toml`.
pub fn load_toml_config() -> TomlConfig {
    let Some(path) = config_file_path() else {
        debug!("No config file found, using defaults");
        return TomlConfig::default();
    };

    match load_toml_config_from(&path) {
        Ok(config) => {
            debug!("Loaded config file: {}", path.display());
            config
        }
        Err(e) => {
            warn!("Ignoring config file {}: {}", path.display(), e);
            TomlConfig::default()
        }
    }
}

/// Load and parse a specific TOML configuration file
pub fn load_toml_config_from(path: &Path) -> Result<TomlConfig> {
    let text = std::fs::read_to_string(path)?;
    parse_toml_config(&text)
}

/// Locate the configuration file for this platform
fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        return Some(PathBuf::from(path));
    }

    let user_config = dirs::config_dir().map(|d| d.join("pymk").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc/pymk/config.toml");
    if cfg!(unix) && system_config.exists() {
        return Some(system_config);
    }

    None
}

/// Root folder resolution, in priority order:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("pymk"))
        .unwrap_or_else(|| PathBuf::from("./pymk_data"))
}

/// Database location inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE_NAME)
}
