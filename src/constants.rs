//! # System Constants
//!
//! Named defaults shared by the key transformer and the database glue.

/// Key conversion cache bounds
pub mod cache {
    /// Maximum number of memoised (key, mode) conversions
    pub const DEFAULT_CAPACITY: usize = 100_000;
    /// Source keys of this many characters or more are never cached
    pub const MAX_CACHEABLE_KEY_LENGTH: usize = 100;
}

/// Database setup defaults
pub mod database {
    use std::time::Duration;

    pub const DEFAULT_CLIENT: &str = "pg";
    pub const DEFAULT_MIGRATIONS_DIRECTORY: &str = "./migrations";
    pub const DEFAULT_HOST: &str = "127.0.0.1";
    pub const POOL_MIN_CONNECTIONS: u32 = 2;
    pub const POOL_MAX_CONNECTIONS: u32 = 10;
    pub const SLOW_QUERY_THRESHOLD_MS: u64 = 200;
    /// Fixed delay between migration attempts after a connection failure
    pub const MIGRATION_RETRY_DELAY: Duration = Duration::from_secs(3);
    /// Pool gauge sampling period
    pub const POOL_SAMPLE_INTERVAL: Duration = Duration::from_secs(5);
    pub const REDACTED_PASSWORD: &str = "****";
}

/// Prometheus metric names
pub mod metrics {
    pub const POOL_USED: &str = "db_pool_used";
    pub const POOL_FREE: &str = "db_pool_free";
    pub const POOL_PENDING_ACQUIRES: &str = "db_pool_pending_acquires";
    pub const POOL_PENDING_CREATES: &str = "db_pool_pending_creates";
    pub const QUERY_DURATION: &str = "db_query_duration_seconds";
    pub const QUERY_METHOD_LABEL: &str = "method";
}
