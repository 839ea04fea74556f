//! # Migrations
//!
//! Runs pending migrations to latest and keeps retrying while the database is
//! unreachable. Unreachable means the connection was refused, the host could
//! not be resolved, or the pool timed out waiting for a connection; every other
//! failure is returned to the caller unchanged.
//!
//! Migrations are discovered by sqlx from the configured directory using its
//! `<VERSION>_<DESCRIPTION>.sql` naming convention.

use async_trait::async_trait;
use sqlx::migrate::{Migrate, MigrateError, Migrator};
use sqlx::PgPool;
use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

use crate::error::{KeycaseDbError, Result};

/// Outcome of a migrate-to-latest run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MigrationBatch {
    /// Version of the newest applied migration, 0 when none exist
    pub batch: i64,
    /// Names of migrations applied by this run, in order
    pub applied: Vec<String>,
}

impl MigrationBatch {
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Something that can bring a schema up to date.
#[async_trait]
pub trait MigrationTarget: Send + Sync {
    async fn migrate_latest(&self) -> Result<MigrationBatch>;
}

/// sqlx-backed migrations read from a directory.
#[derive(Debug)]
pub struct SqlxMigrationTarget {
    pool: PgPool,
    migrator: Migrator,
}

impl SqlxMigrationTarget {
    pub fn new(pool: PgPool, migrator: Migrator) -> Self {
        Self { pool, migrator }
    }

    pub async fn from_directory(pool: PgPool, directory: &Path) -> Result<Self> {
        let migrator = Migrator::new(directory).await?;
        Ok(Self::new(pool, migrator))
    }

    async fn applied_versions(&self) -> std::result::Result<HashSet<i64>, MigrateError> {
        let mut conn = self.pool.acquire().await?;
        conn.ensure_migrations_table().await?;
        let applied = conn.list_applied_migrations().await?;
        Ok(applied.into_iter().map(|m| m.version).collect())
    }
}

#[async_trait]
impl MigrationTarget for SqlxMigrationTarget {
    async fn migrate_latest(&self) -> Result<MigrationBatch> {
        let before = self.applied_versions().await.map_err(classify_migrate_error)?;

        self.migrator
            .run(&self.pool)
            .await
            .map_err(classify_migrate_error)?;

        let mut batch = before.iter().copied().max().unwrap_or(0);
        let mut applied = Vec::new();
        for migration in self.migrator.iter() {
            if migration.migration_type.is_down_migration() || before.contains(&migration.version)
            {
                continue;
            }
            batch = batch.max(migration.version);
            applied.push(format!("{}_{}", migration.version, migration.description));
        }

        Ok(MigrationBatch { batch, applied })
    }
}

/// Error code for failures that mean the database is not reachable yet.
pub fn connection_failure_code(error: &sqlx::Error) -> Option<&'static str> {
    match error {
        sqlx::Error::Io(io) => io_failure_code(io),
        sqlx::Error::PoolTimedOut => Some("POOL_TIMED_OUT"),
        _ => None,
    }
}

fn io_failure_code(error: &io::Error) -> Option<&'static str> {
    match error.kind() {
        io::ErrorKind::ConnectionRefused => Some("ECONNREFUSED"),
        io::ErrorKind::NotFound => Some("ENOTFOUND"),
        _ => {
            let message = error.to_string();
            let unresolved = message.contains("failed to lookup address")
                || message.contains("Name or service not known")
                || message.contains("nodename nor servname");
            unresolved.then_some("ENOTFOUND")
        }
    }
}

pub fn classify_sqlx_error(error: sqlx::Error) -> KeycaseDbError {
    match connection_failure_code(&error) {
        Some(code) => KeycaseDbError::TransientConnection {
            code: code.to_string(),
        },
        None => KeycaseDbError::Database(error),
    }
}

fn classify_migrate_error(error: MigrateError) -> KeycaseDbError {
    match error {
        MigrateError::Execute(inner) => classify_sqlx_error(inner),
        other => KeycaseDbError::Migration(other),
    }
}

/// Migrate to latest, waiting `retry_delay` between attempts while the
/// database is unreachable. Never gives up on connection failures.
pub async fn migrate_with_retry<T>(target: &T, retry_delay: Duration) -> Result<MigrationBatch>
where
    T: MigrationTarget + ?Sized,
{
    let mut attempt: u32 = 1;
    loop {
        match target.migrate_latest().await {
            Ok(batch) => {
                if !batch.is_empty() {
                    info!(
                        batch = batch.batch,
                        count = batch.applied.len(),
                        "Migration batch {} run: {} migrations",
                        batch.batch,
                        batch.applied.len()
                    );
                    info!("{}", batch.applied.join("\n"));
                }
                return Ok(batch);
            }
            Err(KeycaseDbError::TransientConnection { code }) => {
                error!(attempt, code = %code, "Could not connect to db: {}", code);
            }
            Err(other) => return Err(other),
        }

        tokio::time::sleep(retry_delay).await;
        attempt += 1;
        info!(attempt, "Retrying db setup...");
    }
}
