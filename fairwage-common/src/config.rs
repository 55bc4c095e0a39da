//! Bootstrap configuration loading and root folder resolution
//!
//! The TOML bootstrap file carries only what is needed to start a service:
//! where the database lives, where to listen, which rules file to load and
//! how to log. Everything has a built-in default, and a missing file is not
//! an error.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "FAIRWAGE_ROOT_FOLDER";

/// Database file name used when `database_path` is not configured
pub const DEFAULT_DATABASE_FILE: &str = "fairwage.db";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    /// Folder holding the database (and, by convention, the rules file)
    pub root_folder: Option<PathBuf>,

    /// SQLite database path; relative paths resolve against the root folder
    pub database_path: Option<PathBuf>,

    pub host: String,

    pub port: u16,

    /// Rules TOML file; built-in rules are used when absent
    pub rules_file: Option<PathBuf>,

    /// Largest accepted batch assessment
    pub max_batch_size: usize,

    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            database_path: None,
            host: "127.0.0.1".to_string(),
            port: 5780,
            rules_file: None,
            max_batch_size: 500,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config: TomlConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        if config.max_batch_size == 0 {
            return Err(Error::Config("max_batch_size must be at least 1".to_string()));
        }
        Ok(config)
    }

    /// Load the config file if one is available, otherwise use defaults
    ///
    /// An explicitly named file that fails to parse is still an error; a
    /// missing file falls back to defaults. Nothing is logged here because
    /// this runs before the subscriber exists; call [`ConfigSource::log`]
    /// once tracing is initialized.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let candidate = explicit.map(Path::to_path_buf).or_else(default_config_path);
        match candidate {
            Some(path) if path.exists() => {
                let config = Self::load(&path)?;
                Ok((config, ConfigSource::File(path)))
            }
            Some(path) => Ok((Self::default(), ConfigSource::Missing(path))),
            None => Ok((Self::default(), ConfigSource::NoLocation)),
        }
    }

    /// Resolve the database path against a root folder
    pub fn database_path(&self, root_folder: &Path) -> PathBuf {
        match &self.database_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => root_folder.join(path),
            None => root_folder.join(DEFAULT_DATABASE_FILE),
        }
    }

    /// Resolve the rules file path against a root folder
    pub fn rules_path(&self, root_folder: &Path) -> Option<PathBuf> {
        self.rules_file.as_ref().map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                root_folder.join(path)
            }
        })
    }
}

/// Where the bootstrap configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// This file did not exist; defaults in use
    Missing(PathBuf),
    /// No config directory on this platform; defaults in use
    NoLocation,
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
            ConfigSource::Missing(path) => {
                warn!("Config file {} not found, using defaults", path.display())
            }
            ConfigSource::NoLocation => warn!("No config file location available, using defaults"),
        }
    }
}

/// Root folder resolution priority:
/// 1. Command-line argument (highest priority)
/// 2. `FAIRWAGE_ROOT_FOLDER` environment variable
/// 3. TOML `root_folder`
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Default configuration file path (`<config dir>/fairwage/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fairwage").join("config.toml"))
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("fairwage"))
        .unwrap_or_else(|| PathBuf::from("./fairwage_data"))
}

/// Create the root folder if needed (idempotent)
pub fn ensure_root_folder(root_folder: &Path) -> Result<()> {
    if !root_folder.exists() {
        std::fs::create_dir_all(root_folder)?;
        info!("Created root folder: {}", root_folder.display());
    }
    Ok(())
}
