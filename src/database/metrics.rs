//! Pool and query metrics
//!
//! Gauges track pool occupancy and are refreshed by a background sampler;
//! the histogram records every timed query labelled by its SQL method.

use prometheus::{HistogramOpts, HistogramVec, IntGauge, Registry};
use sqlx::PgPool;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::constants::metrics as names;
use crate::error::Result;

/// Database metrics collector
#[derive(Clone)]
pub struct DatabaseMetrics {
    pool_used: IntGauge,
    pool_free: IntGauge,
    pool_pending_acquires: IntGauge,
    pool_pending_creates: IntGauge,
    query_duration: HistogramVec,
}

impl DatabaseMetrics {
    /// Create an unregistered set of metrics
    pub fn new() -> Result<Self> {
        let pool_used = IntGauge::new(names::POOL_USED, "Number of connections in use")?;
        let pool_free = IntGauge::new(names::POOL_FREE, "Number of idle connections")?;
        let pool_pending_acquires = IntGauge::new(
            names::POOL_PENDING_ACQUIRES,
            "Number of callers waiting for a connection",
        )?;
        let pool_pending_creates = IntGauge::new(
            names::POOL_PENDING_CREATES,
            "Number of connections being established",
        )?;
        let query_duration = HistogramVec::new(
            HistogramOpts::new(names::QUERY_DURATION, "Query execution time in seconds"),
            &[names::QUERY_METHOD_LABEL],
        )?;

        Ok(Self {
            pool_used,
            pool_free,
            pool_pending_acquires,
            pool_pending_creates,
            query_duration,
        })
    }

    /// Process-wide metrics shared by every [`Database`](crate::database::Database)
    pub fn global() -> &'static DatabaseMetrics {
        static METRICS: OnceLock<DatabaseMetrics> = OnceLock::new();
        METRICS.get_or_init(|| Self::new().expect("Failed to create database metrics"))
    }

    /// Register all five metrics with `registry`
    pub fn register(&self, registry: &Registry) -> Result<()> {
        registry.register(Box::new(self.pool_used.clone()))?;
        registry.register(Box::new(self.pool_free.clone()))?;
        registry.register(Box::new(self.pool_pending_acquires.clone()))?;
        registry.register(Box::new(self.pool_pending_creates.clone()))?;
        registry.register(Box::new(self.query_duration.clone()))?;
        Ok(())
    }

    pub fn observe_query(&self, method: &str, duration: Duration) {
        self.query_duration
            .with_label_values(&[method])
            .observe(duration.as_secs_f64());
    }

    /// Update the pool gauges; counts the source cannot report are left untouched
    pub fn record_pool(&self, snapshot: &PoolSnapshot) {
        self.pool_used.set(i64::from(snapshot.used));
        self.pool_free.set(i64::from(snapshot.free));
        if let Some(pending) = snapshot.pending_acquires {
            self.pool_pending_acquires.set(i64::from(pending));
        }
        if let Some(pending) = snapshot.pending_creates {
            self.pool_pending_creates.set(i64::from(pending));
        }
    }

    pub fn pool_used(&self) -> i64 {
        self.pool_used.get()
    }

    pub fn pool_free(&self) -> i64 {
        self.pool_free.get()
    }

    pub fn pool_pending_acquires(&self) -> i64 {
        self.pool_pending_acquires.get()
    }

    pub fn pool_pending_creates(&self) -> i64 {
        self.pool_pending_creates.get()
    }

    pub fn query_count(&self, method: &str) -> u64 {
        self.query_duration
            .with_label_values(&[method])
            .get_sample_count()
    }
}

/// Register the process-wide metrics with `registry`
pub fn register_metrics(registry: &Registry) -> Result<()> {
    DatabaseMetrics::global().register(registry)
}

impl std::fmt::Debug for DatabaseMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseMetrics")
            .field("pool_used", &self.pool_used.get())
            .field("pool_free", &self.pool_free.get())
            .finish_non_exhaustive()
    }
}

/// Point-in-time pool occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolSnapshot {
    pub used: u32,
    pub free: u32,
    pub pending_acquires: Option<u32>,
    pub pending_creates: Option<u32>,
}

/// Anything that can report pool occupancy
pub trait PoolStatsSource: Send + Sync + 'static {
    /// `None` when the pool is closed or not yet initialised
    fn pool_snapshot(&self) -> Option<PoolSnapshot>;
}

impl PoolStatsSource for PgPool {
    fn pool_snapshot(&self) -> Option<PoolSnapshot> {
        if self.is_closed() {
            return None;
        }

        let size = self.size();
        let idle = self.num_idle() as u32;
        Some(PoolSnapshot {
            used: size.saturating_sub(idle),
            free: idle,
            // sqlx does not expose waiter or in-flight connect counts
            pending_acquires: None,
            pending_creates: None,
        })
    }
}

/// Handle to a running pool sampler; the task stops when the handle is dropped
#[derive(Debug)]
pub struct PoolSampler {
    handle: JoinHandle<()>,
}

impl PoolSampler {
    pub fn stop(self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for PoolSampler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Sample `source` into `metrics` every `interval`, starting immediately
pub fn spawn_pool_sampler<S>(source: S, metrics: DatabaseMetrics, interval: Duration) -> PoolSampler
where
    S: PoolStatsSource,
{
    debug!(interval_ms = interval.as_millis() as u64, "Starting pool sampler");

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match source.pool_snapshot() {
                Some(snapshot) => {
                    trace!(used = snapshot.used, free = snapshot.free, "Sampled pool");
                    metrics.record_pool(&snapshot);
                }
                None => trace!("Pool unavailable, skipping sample"),
            }
        }
    });

    PoolSampler { handle }
}
