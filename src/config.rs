use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{QuoteError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.jsonbin.io/v3/b";
pub const DEFAULT_ACCESS_KEY_HEADER: &str = "X-Access-Key";
pub const DEFAULT_BIN_NAME: &str = "Beautiful Words Quotes";

pub const ENV_BASE_URL: &str = "QUOTEBIN_BASE_URL";
pub const ENV_ACCESS_KEY: &str = "QUOTEBIN_ACCESS_KEY";
pub const ENV_BIN_ID: &str = "QUOTEBIN_BIN_ID";
pub const ENV_ACCESS_KEY_HEADER: &str = "QUOTEBIN_ACCESS_KEY_HEADER";
pub const ENV_DATA_DIR: &str = "QUOTEBIN_DATA_DIR";

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the bin API, without a trailing slash
    pub base_url: String,

    /// Access key sent with every request
    pub access_key: Option<String>,

    /// Bin holding the quotes; created on first save when absent
    pub bin_id: Option<String>,

    /// Header name the access key is sent under
    pub access_key_header: String,

    /// Name given to a newly created bin
    pub bin_name: Option<String>,

    /// Directory for the local key-value store
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_key: None,
            bin_id: None,
            access_key_header: DEFAULT_ACCESS_KEY_HEADER.to_string(),
            bin_name: Some(DEFAULT_BIN_NAME.to_string()),
            data_dir: Self::default_data_dir(),
        }
    }
}

impl Config {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "quotebin", "quotebin")
    }

    /// Platform data directory, or `./.quotebin` when none can be determined.
    pub fn default_data_dir() -> PathBuf {
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".quotebin"))
    }

    /// Default location of the optional JSON config file.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Path of the local key-value store file.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("store.json")
    }

    /// Builds the configuration from defaults, the config file and the process environment.
    ///
    /// An explicitly given `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(default_path) if default_path.exists() => Self::from_file(&default_path)?,
                _ => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.normalize();
        debug!("Effective configuration: {:?}", config.redacted());
        Ok(config)
    }

    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| QuoteError::ConfigError {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        serde_json::from_str(&content).map_err(|e| QuoteError::ConfigError {
            message: format!("failed to parse {}: {}", path.display(), e),
        })
    }

    /// Overrides fields from environment-style lookups. Empty values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(access_key) = lookup(ENV_ACCESS_KEY) {
            self.access_key = Some(access_key);
        }
        if let Some(bin_id) = lookup(ENV_BIN_ID) {
            self.bin_id = Some(bin_id);
        }
        if let Some(header) = lookup(ENV_ACCESS_KEY_HEADER) {
            self.access_key_header = header;
        }
        if let Some(data_dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(data_dir);
        }
    }

    /// Trims the base URL and drops blank optional values.
    pub fn normalize(&mut self) {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        for value in [&mut self.access_key, &mut self.bin_id, &mut self.bin_name] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *value = None;
            }
        }
    }

    /// Copy safe to log: the access key is masked.
    pub fn redacted(&self) -> Self {
        Self {
            access_key: self.access_key.as_ref().map(|_| "***".to_string()),
            ..self.clone()
        }
    }
}
