//! # Database Settings
//!
//! Layered configuration for the database glue:
//!
//! 1. Built-in defaults (see [`crate::constants::database`])
//! 2. An optional configuration file (`KEYCASE_DB_CONFIG`, else `config/database.*`)
//! 3. `KEYCASE_DB_*` environment variables (`__` separates nested fields,
//!    e.g. `KEYCASE_DB_POOL__MAX=20`)
//!
//! `DATABASE_URL` is used when no connection is configured by any layer.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use keycase_db::config::DatabaseSettings;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = DatabaseSettings::load()?;
//! println!("pool: {}..{}", settings.pool.min, settings.pool.max);
//! # Ok(())
//! # }
//! ```

pub mod error;

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::constants::database as defaults;
use crate::database::connection::Connection;

pub use error::{ConfigResult, ConfigurationError};

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "KEYCASE_DB_CONFIG";
/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "KEYCASE_DB";
const DEFAULT_CONFIG_FILE: &str = "config/database";

/// Connection pool bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    pub min: u32,
    pub max: u32,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            min: defaults::POOL_MIN_CONNECTIONS,
            max: defaults::POOL_MAX_CONNECTIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub connection: Option<Connection>,
    /// Driver name; only `pg` is supported
    pub client: String,
    pub migrations_directory: PathBuf,
    pub pool: PoolSettings,
    /// Queries at or above this duration are logged as slow
    pub slow_query_threshold_ms: u64,
    /// Run migrations to latest during setup
    pub migrate_up: bool,
    pub pool_sample_interval_ms: u64,
    pub migration_retry_delay_ms: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            connection: None,
            client: defaults::DEFAULT_CLIENT.to_string(),
            migrations_directory: PathBuf::from(defaults::DEFAULT_MIGRATIONS_DIRECTORY),
            pool: PoolSettings::default(),
            slow_query_threshold_ms: defaults::SLOW_QUERY_THRESHOLD_MS,
            migrate_up: true,
            pool_sample_interval_ms: defaults::POOL_SAMPLE_INTERVAL.as_millis() as u64,
            migration_retry_delay_ms: defaults::MIGRATION_RETRY_DELAY.as_millis() as u64,
        }
    }
}

impl DatabaseSettings {
    /// Load settings with the file location taken from `KEYCASE_DB_CONFIG`.
    pub fn load() -> ConfigResult<Self> {
        let path = env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    /// Load settings from an optional file at `path` plus environment overrides.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        debug!(path = %path.display(), "Loading database settings");

        let layered = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| ConfigurationError::load_error(path.display().to_string(), e))?;

        let mut settings: Self = layered
            .try_deserialize()
            .map_err(|e| ConfigurationError::load_error(path.display().to_string(), e))?;

        if settings.connection.is_none() {
            if let Ok(url) = env::var("DATABASE_URL") {
                settings.connection = Some(Connection::Url(url));
            }
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.client != defaults::DEFAULT_CLIENT {
            return Err(ConfigurationError::invalid_value(
                "client",
                self.client.clone(),
                "only the PostgreSQL client 'pg' is supported",
            ));
        }

        if self.pool.max == 0 {
            return Err(ConfigurationError::validation_error(
                "pool.max must be at least 1",
            ));
        }

        if self.pool.min > self.pool.max {
            return Err(ConfigurationError::validation_error(format!(
                "pool.min ({}) cannot exceed pool.max ({})",
                self.pool.min, self.pool.max
            )));
        }

        Ok(())
    }

    pub fn slow_query_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_query_threshold_ms)
    }

    pub fn pool_sample_interval(&self) -> Duration {
        Duration::from_millis(self.pool_sample_interval_ms)
    }

    pub fn migration_retry_delay(&self) -> Duration {
        Duration::from_millis(self.migration_retry_delay_ms)
    }
}
