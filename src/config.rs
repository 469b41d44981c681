//! Configuration module
//!
//! Runtime configuration comes from the environment. Calendar preferences
//! (first day of week, time format, window size) live in the database's
//! settings table instead.

use crate::error::{AppError, AppResult};
use crate::utils::RetryConfig;
use log::info;
use std::env;
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "WEEKPLAN_DB_PATH";
pub const FETCH_RETRIES_VAR: &str = "WEEKPLAN_FETCH_RETRIES";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub retry: RetryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            retry: RetryConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        let mut config = AppConfig::default();

        if let Ok(path) = env::var(DB_PATH_VAR) {
            if !path.trim().is_empty() {
                config.db_path = PathBuf::from(path);
            }
        }

        if let Ok(raw) = env::var(FETCH_RETRIES_VAR) {
            config.retry.max_attempts = raw.trim().parse().map_err(|_| {
                AppError::config(format!("{} must be a positive integer, got '{}'", FETCH_RETRIES_VAR, raw))
            })?;
        }

        Ok(config)
    }
}

/// `<data dir>/weekplan/weekplan.db`, or `./weekplan.db` when the platform
/// has no data directory.
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("weekplan").join("weekplan.db"))
        .unwrap_or_else(|| PathBuf::from("weekplan.db"))
}

/// Validates application configuration
///
/// # Returns
///
/// * `Ok(())` - configuration is usable
/// * `Err(AppError::Config)` - describes the first problem found
///
pub fn validate_config(config: &AppConfig) -> AppResult<()> {
    info!("Validating configuration (database: {})", config.db_path.display());

    if config.db_path.as_os_str().is_empty() {
        return Err(AppError::config("database path cannot be empty"));
    }
    if config.db_path.is_dir() {
        return Err(AppError::config(format!(
            "database path {} is a directory",
            config.db_path.display()
        )));
    }
    if config.retry.max_attempts == 0 {
        return Err(AppError::config("fetch retries must be at least 1"));
    }

    Ok(())
}
