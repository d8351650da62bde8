use crate::core::rate::BASE_CURRENCY;
use crate::core::rates::DEFAULT_REFRESH_COOLDOWN_MINUTES;
use crate::providers::currency_layer::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CurrencyLayerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub access_key: String,
    pub timeout_secs: Option<u64>,
}

impl CurrencyLayerConfig {
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_currency() -> String {
    BASE_CURRENCY.to_string()
}

fn default_refresh_cooldown_minutes() -> i64 {
    DEFAULT_REFRESH_COOLDOWN_MINUTES
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub provider: CurrencyLayerConfig,
    /// Source currency used when none is given on the command line
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_refresh_cooldown_minutes")]
    pub refresh_cooldown_minutes: i64,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fxcache", "fxcache")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "fxcache", "fxcache")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn refresh_cooldown(&self) -> Result<chrono::Duration> {
        chrono::Duration::try_minutes(self.refresh_cooldown_minutes).with_context(|| {
            format!(
                "refresh_cooldown_minutes is out of range: {}",
                self.refresh_cooldown_minutes
            )
        })
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        if config.refresh_cooldown_minutes < 0 {
            anyhow::bail!(
                "refresh_cooldown_minutes must not be negative in {}",
                path.as_ref().display()
            );
        }
        config
            .refresh_cooldown()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
