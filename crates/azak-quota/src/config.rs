//! Configuration for the view quota

use crate::error::{QuotaError, Result};
use crate::storage::is_file_safe_key;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Free stock-detail views per day for anonymous visitors
pub const DAILY_VIEW_LIMIT: usize = 3;

/// Key the quota record is stored under
pub const DEFAULT_STORAGE_KEY: &str = "azak_view_limit";

/// Directory used by file-backed storage when nothing else is configured
pub const DEFAULT_DATA_DIR: &str = ".azak";

/// Environment variable overriding the data directory
pub const ENV_DATA_DIR: &str = "AZAK_DATA_DIR";

/// Environment variable overriding the storage key
pub const ENV_STORAGE_KEY: &str = "AZAK_STORAGE_KEY";

/// Configuration for quota persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Key the record is persisted under
    pub storage_key: String,

    /// Directory for file-backed storage
    pub data_dir: PathBuf,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl QuotaConfig {
    /// Create a new configuration builder
    pub fn builder() -> QuotaConfigBuilder {
        QuotaConfigBuilder::default()
    }

    /// Daily limit in effect
    pub fn daily_limit(&self) -> usize {
        DAILY_VIEW_LIMIT
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(QuotaError::ConfigError(
                "storage_key must not be empty".to_string(),
            ));
        }

        // The key doubles as a file name for file-backed storage.
        if !is_file_safe_key(&self.storage_key) {
            return Err(QuotaError::ConfigError(format!(
                "storage_key {:?} may only contain ASCII letters, digits, '_', '-' and '.'",
                self.storage_key
            )));
        }

        if self.data_dir.as_os_str().is_empty() {
            return Err(QuotaError::ConfigError(
                "data_dir must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for QuotaConfig
#[derive(Debug, Default)]
pub struct QuotaConfigBuilder {
    storage_key: Option<String>,
    data_dir: Option<PathBuf>,
}

impl QuotaConfigBuilder {
    /// Set the storage key
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    /// Set the data directory
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Load unset values from the environment
    pub fn with_env(self) -> Self {
        self.with_lookup(|key| std::env::var(key).ok())
    }

    fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.storage_key.is_none() {
            self.storage_key = lookup(ENV_STORAGE_KEY);
        }
        if self.data_dir.is_none() {
            self.data_dir = lookup(ENV_DATA_DIR).map(PathBuf::from);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<QuotaConfig> {
        let defaults = QuotaConfig::default();

        let config = QuotaConfig {
            storage_key: self.storage_key.unwrap_or(defaults.storage_key),
            data_dir: self.data_dir.unwrap_or(defaults.data_dir),
        };

        config.validate()?;
        Ok(config)
    }
}
