use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TABLE: &str = "development_log";
pub const DEFAULT_BUCKET: &str = "images";
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root of the hosted backend, e.g. `https://xyz.supabase.co`
    pub backend_url: String,
    pub api_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Quiet period before text edits are committed
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Config {
    pub fn new(backend_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            api_key: api_key.into(),
            table: default_table(),
            bucket: default_bucket(),
            page_size: default_page_size(),
            debounce_ms: default_debounce_ms(),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Keys usually live in the environment rather than the file
        config.backend_url = Self::expand(&config.backend_url).unwrap_or(config.backend_url);
        config.api_key = Self::expand(&config.api_key).unwrap_or(config.api_key);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/devlog");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    fn expand(value: &str) -> Option<String> {
        shellexpand::full(value)
            .ok()
            .map(|expanded| expanded.into_owned())
    }
}
