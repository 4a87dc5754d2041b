//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Environment variable naming the database file.
pub const DB_PATH_ENV: &str = "ONBOARD_DB_PATH";

/// Default on-disk location of the profile database.
pub const DEFAULT_DB_PATH: &str = "./data/onboarding.db";

/// Application configuration for the terminal front end.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path to the libSQL database holding the profile and settings.
    pub db_path: PathBuf,
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Build configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup(DB_PATH_ENV) {
            if path.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: DB_PATH_ENV.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }
            config.db_path = PathBuf::from(path);
        }

        if let Some(filter) = lookup("RUST_LOG").filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter;
        }

        Ok(config)
    }
}
