use metrics::Counter;
use metrics_derive::Metrics;

/// The metrics for the [`super::RollupProducer`].
#[derive(Metrics, Clone)]
#[metrics(scope = "rollup.producer")]
pub struct ProducerMetrics {
    /// The produced rollups.
    pub produced_rollups: Counter,
    /// The batches packed into rollups.
    pub rolled_up_batches: Counter,
}

/// The metrics for the [`super::RollupConsumer`].
#[derive(Metrics, Clone)]
#[metrics(scope = "rollup.consumer")]
pub struct ConsumerMetrics {
    /// The consumed rollups.
    pub consumed_rollups: Counter,
    /// The rejected rollups.
    pub rejected_rollups: Counter,
    /// The batches executed from rollups.
    pub executed_batches: Counter,
    /// The batches skipped because they were known or anchored to an unknown block.
    pub skipped_batches: Counter,
}
