use metrics::{Counter, Histogram};
use metrics_derive::Metrics;

/// The metrics for the [`super::Sequencer`].
#[derive(Metrics, Clone)]
#[metrics(scope = "sequencer")]
pub struct SequencerMetrics {
    /// The number of created batches, genesis included.
    pub created_batches: Counter,
    /// The number of batches replayed on a new L1 branch.
    pub replayed_batches: Counter,
    /// The number of created rollups.
    pub created_rollups: Counter,
    /// The duration of batch creation.
    pub batch_creation_duration: Histogram,
}

/// The metrics for the [`super::Validator`].
#[derive(Metrics, Clone)]
#[metrics(scope = "validator")]
pub struct ValidatorMetrics {
    /// The number of batches received directly from the sequencer and stored.
    pub submitted_batches: Counter,
    /// The number of batches received directly from the sequencer and rejected.
    pub rejected_batches: Counter,
}

/// The metrics for the [`super::EnclaveHandle`].
#[derive(Metrics, Clone)]
#[metrics(scope = "enclave.handle")]
pub(crate) struct HandleMetrics {
    /// Failed to send command to the enclave task.
    pub(crate) handle_send_command_failed: Counter,
}
