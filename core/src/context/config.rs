//! Application configuration persisted with confy.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const APP_NAME: &str = "loot-tracker";
const CONFIG_NAME: &str = "config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// The game's `UE_game.log`.
    #[serde(default)]
    pub log_path: Option<PathBuf>,
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
    #[serde(default = "default_drop_log_path")]
    pub drop_log_path: PathBuf,
    #[serde(default)]
    pub tax_enabled: bool,
    #[serde(default)]
    pub user: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// How often a missing or failed log file is re-opened.
    #[serde(default = "default_reopen_interval_secs")]
    pub reopen_interval_secs: u64,
    /// Minimum seconds between two accepted price writes for one item.
    #[serde(default = "default_price_throttle_secs")]
    pub price_throttle_secs: i64,
    /// Item names never counted as drops.
    #[serde(default)]
    pub excluded_items: Vec<String>,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("full_table.json")
}

fn default_drop_log_path() -> PathBuf {
    PathBuf::from("drop.txt")
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_reopen_interval_secs() -> u64 {
    30
}

fn default_price_throttle_secs() -> i64 {
    3_600
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            catalog_path: default_catalog_path(),
            drop_log_path: default_drop_log_path(),
            tax_enabled: false,
            user: String::new(),
            poll_interval_ms: default_poll_interval_ms(),
            reopen_interval_secs: default_reopen_interval_secs(),
            price_throttle_secs: default_price_throttle_secs(),
            excluded_items: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load the stored configuration, falling back to defaults.
    pub fn load() -> Self {
        match confy::load(APP_NAME, CONFIG_NAME) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load configuration, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        Ok(confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)?)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn reopen_interval(&self) -> Duration {
        Duration::from_secs(self.reopen_interval_secs)
    }
}
