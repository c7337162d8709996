use metrics::{Counter, Gauge};
use metrics_derive::Metrics;

/// The metrics for the [`super::L1BlockProcessor`].
#[derive(Metrics, Clone)]
#[metrics(scope = "block_processor")]
pub struct BlockProcessorMetrics {
    /// The ingested L1 blocks.
    pub ingested_blocks: Counter,
    /// The L1 forks detected.
    pub forks: Counter,
    /// The L1 blocks moved off the canonical chain by forks.
    pub non_canonical_blocks: Counter,
    /// The height of the L1 head block.
    pub head_block_number: Gauge,
}
