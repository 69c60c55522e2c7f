//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (KENNEL_*)
//! 2. TOML config file (if KENNEL_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (KENNEL_*)
/// 2. TOML config file (if KENNEL_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via KENNEL_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Base URL of the dog.ceo API.
    ///
    /// Set via KENNEL_API_BASE_URL environment variable.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via KENNEL_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for the breed listing, in milliseconds.
    ///
    /// Set via KENNEL_LIST_TIMEOUT_MS environment variable.
    #[serde(default = "default_list_timeout_ms")]
    pub list_timeout_ms: u64,

    /// Timeout for the per-breed image sample, in milliseconds.
    ///
    /// Set via KENNEL_IMAGES_TIMEOUT_MS environment variable.
    #[serde(default = "default_images_timeout_ms")]
    pub images_timeout_ms: u64,

    /// Number of random images requested per breed.
    ///
    /// Set via KENNEL_IMAGES_PER_BREED environment variable.
    #[serde(default = "default_images_per_breed")]
    pub images_per_breed: u32,

    /// Quiet period before search input settles, in milliseconds.
    ///
    /// Set via KENNEL_DEBOUNCE_MS environment variable.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./kennel-cache.sqlite")
}

fn default_api_base_url() -> String {
    "https://dog.ceo/api".into()
}

fn default_user_agent() -> String {
    "kennel/0.1".into()
}

fn default_list_timeout_ms() -> u64 {
    10_000
}

fn default_images_timeout_ms() -> u64 {
    15_000
}

fn default_images_per_breed() -> u32 {
    50
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            api_base_url: default_api_base_url(),
            user_agent: default_user_agent(),
            list_timeout_ms: default_list_timeout_ms(),
            images_timeout_ms: default_images_timeout_ms(),
            images_per_breed: default_images_per_breed(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl AppConfig {
    /// Bound for lightweight resources (the breed listing).
    pub fn list_timeout(&self) -> Duration {
        Duration::from_millis(self.list_timeout_ms)
    }

    /// Bound for bulk resources (image samples).
    pub fn images_timeout(&self) -> Duration {
        Duration::from_millis(self.images_timeout_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `KENNEL_`
    /// 2. TOML file from `KENNEL_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("KENNEL_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("KENNEL_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./kennel-cache.sqlite"));
        assert_eq!(config.api_base_url, "https://dog.ceo/api");
        assert_eq!(config.user_agent, "kennel/0.1");
        assert_eq!(config.list_timeout_ms, 10_000);
        assert_eq!(config.images_timeout_ms, 15_000);
        assert_eq!(config.images_per_breed, 50);
        assert_eq!(config.debounce_ms, 300);
    }

    #[test]
    fn test_timeout_durations() {
        let config = AppConfig::default();
        assert_eq!(config.list_timeout(), Duration::from_secs(10));
        assert_eq!(config.images_timeout(), Duration::from_secs(15));
        assert_eq!(config.debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kennel.toml");
        std::fs::write(&path, "images_per_breed = 12\ndebounce_ms = 150\n").unwrap();

        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(&path))
            .extract()
            .unwrap();

        assert_eq!(config.images_per_breed, 12);
        assert_eq!(config.debounce_ms, 150);
        assert_eq!(config.list_timeout_ms, 10_000);
    }
}
