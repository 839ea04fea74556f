//! # Database Glue
//!
//! PostgreSQL integration built on SQLx: result rows come back with camelCase
//! keys, camelCase identifiers go out as snake_case, and every query is timed.
//!
//! ## Key Components
//!
//! - [`connection`] - Connection descriptors and credential redaction
//! - [`client_config`] - Pool bounds and the row/identifier case hooks
//! - [`query`] - Query execution with timing and slow query logging
//! - [`metrics`] - Prometheus pool gauges and query duration histogram
//! - [`migrations`] - Migrate-to-latest with retry on connection failures
//! - [`setup`] - Process start-up: pool sampling plus migrations
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use keycase_db::config::DatabaseSettings;
//! use keycase_db::database::{connect_and_setup, register_metrics};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = prometheus::Registry::new();
//! register_metrics(&registry)?;
//!
//! let settings = DatabaseSettings::load()?;
//! let (db, _setup) = connect_and_setup(&settings).await?;
//!
//! let users = db.fetch_json("SELECT user_id, created_at FROM users").await?;
//! // [{"userId": 1, "createdAt": "..."}]
//! # Ok(())
//! # }
//! ```

pub mod client_config;
pub mod connection;
pub mod metrics;
pub mod migrations;
pub mod query;
pub mod setup;

pub use client_config::{quote_identifier, DatabaseConfig};
pub use connection::{format_connection, Connection, ConnectionParams};
pub use metrics::{
    register_metrics, spawn_pool_sampler, DatabaseMetrics, PoolSampler, PoolSnapshot,
    PoolStatsSource,
};
pub use migrations::{
    classify_sqlx_error, connection_failure_code, migrate_with_retry, MigrationBatch,
    MigrationTarget, SqlxMigrationTarget,
};
pub use query::{sql_method, Database};
pub use setup::{connect_and_setup, setup, setup_with_target, SetupHandle, SetupOptions};
