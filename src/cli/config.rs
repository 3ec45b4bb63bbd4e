//! Configuration file support.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::store::StoreOptions;

const APP_DIR: &str = "tagshelf";

/// Application configuration loaded from config file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Database file
    pub database: Option<PathBuf>,

    /// How long to wait on a locked database, in milliseconds
    pub busy_timeout_ms: Option<u64>,

    /// Check for missing files before every command
    pub reconcile_on_startup: Option<bool>,

    /// Log level when no -v flag is given (error, warn, info, debug, trace)
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from the default config file location.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read config file: {}", config_path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", config_path.display()))
    }

    /// Returns the path to the config file.
    ///
    /// Default: `~/.config/tagshelf/config.toml`
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    /// Resolve the database path, with CLI argument taking precedence.
    ///
    /// Precedence order:
    /// 1. CLI `--db` argument
    /// 2. Config file `database` setting
    /// 3. `tagshelf.db` in the user data directory
    pub fn database_path(&self, cli_db: Option<&PathBuf>) -> PathBuf {
        cli_db
            .cloned()
            .or_else(|| self.database.clone())
            .unwrap_or_else(|| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(APP_DIR)
                    .join("tagshelf.db")
            })
    }

    /// Whether to run the missing-file check before commands. Defaults to true.
    pub fn reconcile_on_startup(&self) -> bool {
        self.reconcile_on_startup.unwrap_or(true)
    }

    /// Store connection settings.
    pub fn store_options(&self) -> StoreOptions {
        let options = StoreOptions::default();
        match self.busy_timeout_ms {
            Some(ms) => options.busy_timeout(Duration::from_millis(ms)),
            None => options,
        }
    }
}
