//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - either timeout is less than 100ms or exceeds 5 minutes
    /// - `images_per_breed` is outside 1..=50
    /// - `debounce_ms` exceeds 10 seconds
    /// - `user_agent` is empty
    /// - `api_base_url` is not an absolute http(s) URL
    ///
    /// Returns `ConfigError::Missing` if `db_path` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("list_timeout_ms", self.list_timeout_ms), ("images_timeout_ms", self.images_timeout_ms)] {
            if value < 100 {
                return Err(ConfigError::Invalid { field: field.into(), reason: "must be at least 100ms".into() });
            }
            if value > 300_000 {
                return Err(ConfigError::Invalid {
                    field: field.into(),
                    reason: "must not exceed 5 minutes (300000ms)".into(),
                });
            }
        }

        if !(1..=50).contains(&self.images_per_breed) {
            return Err(ConfigError::Invalid {
                field: "images_per_breed".into(),
                reason: "must be between 1 and 50".into(),
            });
        }

        if self.debounce_ms > 10_000 {
            return Err(ConfigError::Invalid { field: "debounce_ms".into(), reason: "must not exceed 10s".into() });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        match url::Url::parse(&self.api_base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::Invalid {
                    field: "api_base_url".into(),
                    reason: format!("unsupported scheme: {}", url.scheme()),
                });
            }
            Err(e) => {
                return Err(ConfigError::Invalid { field: "api_base_url".into(), reason: e.to_string() });
            }
        }

        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Missing {
                field: "db_path".into(),
                hint: "Set KENNEL_DB_PATH environment variable".into(),
            });
        }

        if self.debounce_ms == 0 {
            tracing::warn!("debounce_ms is 0; every keystroke will drive the query state");
        }

        Ok(())
    }
}
