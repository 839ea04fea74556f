//! Process-level database setup: pool sampling plus migrations.

use std::time::Duration;
use tracing::info;

use crate::config::DatabaseSettings;
use crate::constants::database::{MIGRATION_RETRY_DELAY, POOL_SAMPLE_INTERVAL};
use crate::database::metrics::{spawn_pool_sampler, PoolSampler};
use crate::database::migrations::{
    migrate_with_retry, MigrationBatch, MigrationTarget, SqlxMigrationTarget,
};
use crate::database::query::Database;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupOptions {
    /// Run migrations to latest before returning
    pub migrate_up: bool,
    pub pool_sample_interval: Duration,
    pub migration_retry_delay: Duration,
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            migrate_up: true,
            pool_sample_interval: POOL_SAMPLE_INTERVAL,
            migration_retry_delay: MIGRATION_RETRY_DELAY,
        }
    }
}

impl From<&DatabaseSettings> for SetupOptions {
    fn from(settings: &DatabaseSettings) -> Self {
        Self {
            migrate_up: settings.migrate_up,
            pool_sample_interval: settings.pool_sample_interval(),
            migration_retry_delay: settings.migration_retry_delay(),
        }
    }
}

/// Keeps the pool sampler alive; dropping it stops sampling.
#[derive(Debug)]
pub struct SetupHandle {
    pub sampler: PoolSampler,
    /// Present when migrations ran
    pub migrations: Option<MigrationBatch>,
}

/// Start pool sampling and, when enabled, migrate the configured directory.
pub async fn setup(database: &Database, options: &SetupOptions) -> Result<SetupHandle> {
    if !options.migrate_up {
        return setup_with_target(database, None, options).await;
    }

    let target = SqlxMigrationTarget::from_directory(
        database.pool().clone(),
        database.config().migrations_directory(),
    )
    .await?;
    setup_with_target(database, Some(&target), options).await
}

/// [`setup`] with an explicit migration target.
pub async fn setup_with_target(
    database: &Database,
    target: Option<&dyn MigrationTarget>,
    options: &SetupOptions,
) -> Result<SetupHandle> {
    info!(
        connection = %database.config().connection,
        slow_query_threshold_ms = database.slow_query_threshold().as_millis() as u64,
        "Setting up database"
    );

    let sampler = spawn_pool_sampler(
        database.pool().clone(),
        database.metrics().clone(),
        options.pool_sample_interval,
    );

    let migrations = match target {
        Some(target) if options.migrate_up => {
            Some(migrate_with_retry(target, options.migration_retry_delay).await?)
        }
        _ => None,
    };

    Ok(SetupHandle {
        sampler,
        migrations,
    })
}

/// Load a lazily connecting [`Database`] from settings and set it up.
pub async fn connect_and_setup(settings: &DatabaseSettings) -> Result<(Database, SetupHandle)> {
    let database = Database::connect_lazy(settings)?;
    let handle = setup(&database, &SetupOptions::from(settings)).await?;
    Ok((database, handle))
}
