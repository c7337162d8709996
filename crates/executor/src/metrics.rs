use metrics::{Counter, Histogram};
use metrics_derive::Metrics;

/// The metrics for the [`super::BatchExecutor`].
#[derive(Metrics, Clone)]
#[metrics(scope = "executor")]
pub struct ExecutorMetrics {
    /// The duration of batch computations.
    pub batch_computation_duration: Histogram,
    /// The ordinary transactions excluded from batches because they could not be executed.
    pub excluded_transactions: Counter,
    /// The committed batches.
    pub committed_batches: Counter,
    /// The batches rejected because their recomputed hash differed.
    pub rejected_batches: Counter,
}
