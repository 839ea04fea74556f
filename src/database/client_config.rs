//! Client configuration: pool bounds, migrations location and the row/identifier
//! case hooks applied around every query.

use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::case::decamelize;
use crate::config::{DatabaseSettings, PoolSettings};
use crate::constants::database::{DEFAULT_CLIENT, DEFAULT_MIGRATIONS_DIRECTORY};
use crate::database::connection::Connection;
use crate::error::{KeycaseDbError, Result};
use crate::keys::{default_transformer, KeyCaseOptions, KeyCaseTransformer};

/// PostgreSQL identifier quoting: `user_id` → `"user_id"`, `*` unchanged.
pub fn quote_identifier(value: &str) -> String {
    if value == "*" {
        return value.to_string();
    }
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub client: String,
    pub connection: Connection,
    pub pool: PoolSettings,
    pub migrations_directory: PathBuf,
    transformer: KeyCaseTransformer,
}

impl DatabaseConfig {
    /// Build a configuration; a missing connection is rejected.
    pub fn new(connection: Option<Connection>) -> Result<Self> {
        let connection = connection.ok_or(KeycaseDbError::MissingConnection)?;

        Ok(Self {
            client: DEFAULT_CLIENT.to_string(),
            connection,
            pool: PoolSettings::default(),
            migrations_directory: PathBuf::from(DEFAULT_MIGRATIONS_DIRECTORY),
            transformer: default_transformer().clone(),
        })
    }

    pub fn from_settings(settings: &DatabaseSettings) -> Result<Self> {
        settings.validate()?;

        let mut config = Self::new(settings.connection.clone())?;
        config.client = settings.client.clone();
        config.pool = settings.pool;
        config.migrations_directory = settings.migrations_directory.clone();
        Ok(config)
    }

    pub fn with_migrations_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.migrations_directory = directory.into();
        self
    }

    pub fn with_pool(mut self, pool: PoolSettings) -> Self {
        self.pool = pool;
        self
    }

    /// Use a dedicated transformer (and cache) instead of the process-wide one.
    pub fn with_transformer(mut self, transformer: KeyCaseTransformer) -> Self {
        self.transformer = transformer;
        self
    }

    pub fn migrations_directory(&self) -> &Path {
        &self.migrations_directory
    }

    /// Hook applied to query results: row keys become camelCase.
    ///
    /// Only the top level of each row is converted; JSON column contents keep
    /// their keys. Scalars, empty objects and empty arrays pass through.
    pub fn post_process_response(&self, result: &Value) -> Value {
        let is_empty = match result {
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => true,
        };
        if is_empty {
            return result.clone();
        }

        self.transformer
            .convert_keys(result, &KeyCaseOptions::default())
    }

    /// Hook applied to outgoing identifiers: `userId` → `orig_impl("user_id")`.
    pub fn wrap_identifier<F>(&self, value: &str, orig_impl: F) -> String
    where
        F: FnOnce(&str) -> String,
    {
        orig_impl(&decamelize(value))
    }

    /// [`wrap_identifier`](Self::wrap_identifier) with PostgreSQL quoting.
    pub fn quote(&self, value: &str) -> String {
        self.wrap_identifier(value, quote_identifier)
    }

    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(self.pool.min)
            .max_connections(self.pool.max)
    }

    /// Create a pool that connects on first use.
    pub fn connect_lazy(&self) -> Result<PgPool> {
        let options = self.connection.connect_options()?;

        info!(
            connection = %self.connection,
            min_connections = self.pool.min,
            max_connections = self.pool.max,
            "Creating database pool"
        );

        Ok(self.pool_options().connect_lazy_with(options))
    }
}
