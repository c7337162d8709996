use metrics::{Counter, Gauge};
use metrics_derive::Metrics;

/// The metrics for the [`super::BatchRegistry`].
#[derive(Metrics, Clone)]
#[metrics(scope = "registry")]
pub struct RegistryMetrics {
    /// The sequence number of the head batch.
    pub head_batch_seq_no: Gauge,
    /// The executed batches.
    pub executed_batches: Counter,
}
