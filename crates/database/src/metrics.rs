use metrics::Histogram;
use metrics_derive::Metrics;

/// The metrics for the [`super::Database`].
#[derive(Metrics, Clone)]
#[metrics(scope = "database")]
pub(crate) struct DatabaseMetrics {
    /// Time (s) to acquire the read lock.
    #[metric(describe = "Time to acquire the database read lock (s)")]
    pub read_lock_acquire_duration: Histogram,
    /// Time (s) to acquire the write lock.
    #[metric(describe = "Time to acquire the database write lock (s)")]
    pub write_lock_acquire_duration: Histogram,
}
