use metrics::{Counter, Gauge};
use metrics_derive::Metrics;

/// The metrics for the [`super::Mempool`].
#[derive(Metrics, Clone)]
#[metrics(scope = "mempool")]
pub struct MempoolMetrics {
    /// The number of pending transactions.
    pub size: Gauge,
    /// The submitted transactions that were rejected.
    pub rejected_transactions: Counter,
    /// The transactions removed once final.
    pub removed_transactions: Counter,
}
