//! Query execution with row key conversion, timing and slow query logging.

use serde_json::Value;
use sqlx::postgres::PgPool;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::DatabaseSettings;
use crate::database::client_config::DatabaseConfig;
use crate::database::metrics::DatabaseMetrics;
use crate::error::Result;

/// Lower-cased leading keyword of a statement, used as the `method` label.
pub fn sql_method(sql: &str) -> String {
    let keyword: String = sql
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();

    if keyword.is_empty() {
        "unknown".to_string()
    } else {
        keyword.to_ascii_lowercase()
    }
}

/// A pool plus the hooks and instrumentation applied to every query.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
    config: Arc<DatabaseConfig>,
    metrics: DatabaseMetrics,
    slow_query_threshold: Duration,
}

impl Database {
    pub fn new(pool: PgPool, config: DatabaseConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            metrics: DatabaseMetrics::global().clone(),
            slow_query_threshold: Duration::from_millis(
                crate::constants::database::SLOW_QUERY_THRESHOLD_MS,
            ),
        }
    }

    /// Build the config and a lazily connecting pool from settings.
    pub fn connect_lazy(settings: &DatabaseSettings) -> Result<Self> {
        let config = DatabaseConfig::from_settings(settings)?;
        let pool = config.connect_lazy()?;
        Ok(Self::new(pool, config).with_slow_query_threshold(settings.slow_query_threshold()))
    }

    pub fn with_metrics(mut self, metrics: DatabaseMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = threshold;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn metrics(&self) -> &DatabaseMetrics {
        &self.metrics
    }

    pub fn slow_query_threshold(&self) -> Duration {
        self.slow_query_threshold
    }

    /// Run `sql` and return its rows as a JSON array with camelCase keys.
    ///
    /// Column order is preserved; nested JSON column values keep their keys.
    pub async fn fetch_json(&self, sql: &str) -> Result<Value> {
        let wrapped = format!(
            "SELECT COALESCE(json_agg(row_to_json(q)), '[]'::json) FROM ({sql}) AS q"
        );
        let rows: Value = self
            .timed(sql, sqlx::query_scalar(&wrapped).fetch_one(&self.pool))
            .await?;

        Ok(self.config.post_process_response(&rows))
    }

    /// First row of [`fetch_json`](Self::fetch_json), if any.
    pub async fn fetch_optional_json(&self, sql: &str) -> Result<Option<Value>> {
        match self.fetch_json(sql).await? {
            Value::Array(rows) => Ok(rows.into_iter().next()),
            _ => Ok(None),
        }
    }

    /// Execute a statement and return the number of affected rows.
    pub async fn execute(&self, sql: &str) -> Result<u64> {
        let result = self
            .timed(sql, sqlx::query(sql).execute(&self.pool))
            .await?;
        Ok(result.rows_affected())
    }

    /// Time any sqlx future as a query on `sql`.
    ///
    /// Failed queries are timed as well.
    pub async fn timed<T, F>(&self, sql: &str, query: F) -> std::result::Result<T, sqlx::Error>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        let started = Instant::now();
        let outcome = query.await;
        self.record_query(sql, started.elapsed());
        outcome
    }

    fn record_query(&self, sql: &str, elapsed: Duration) {
        self.metrics.observe_query(&sql_method(sql), elapsed);

        if elapsed >= self.slow_query_threshold {
            warn!(
                duration_ms = elapsed.as_secs_f64() * 1000.0,
                "SLOW QUERY [{:.2}ms] {}",
                elapsed.as_secs_f64() * 1000.0,
                sql
            );
        } else {
            debug!(duration_ms = elapsed.as_secs_f64() * 1000.0, sql, "Query completed");
        }
    }

    /// Database health check
    pub async fn health_check(&self) -> Result<bool> {
        let ok: i32 = self
            .timed("SELECT 1", sqlx::query_scalar("SELECT 1").fetch_one(&self.pool))
            .await?;
        Ok(ok == 1)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolSettings;
    use crate::database::connection::Connection;

    #[test]
    fn test_sql_method() {
        assert_eq!(sql_method("SELECT * FROM users"), "select");
        assert_eq!(sql_method("  insert into users values (1)"), "insert");
        assert_eq!(sql_method("\nUPDATE users SET name = 'x'"), "update");
        assert_eq!(sql_method("with recent as (select 1) select * from recent"), "with");
        assert_eq!(sql_method(""), "unknown");
        assert_eq!(sql_method("(select 1)"), "unknown");
    }

    #[tokio::test]
    async fn test_timed_records_metrics_and_passes_errors_through() {
        let config = DatabaseConfig::new(Some(Connection::url("postgres://localhost/app")))
            .unwrap()
            .with_pool(PoolSettings { min: 0, max: 1 });
        let pool = config.connect_lazy().unwrap();
        let metrics = DatabaseMetrics::new().unwrap();
        let database = Database::new(pool, config)
            .with_metrics(metrics.clone())
            .with_slow_query_threshold(Duration::ZERO);

        let ok: std::result::Result<i32, sqlx::Error> =
            database.timed("select 1", async { Ok(1) }).await;
        assert_eq!(ok.unwrap(), 1);

        let failed: std::result::Result<i32, sqlx::Error> = database
            .timed("DELETE FROM users", async { Err(sqlx::Error::RowNotFound) })
            .await;
        assert!(matches!(failed, Err(sqlx::Error::RowNotFound)));

        assert_eq!(metrics.query_count("select"), 1);
        assert_eq!(metrics.query_count("delete"), 1);
    }
}
