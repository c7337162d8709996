use alloy_primitives::Address;
use enclave_primitives::{
    constants::{DEFAULT_MAX_BATCH_SIZE, DEFAULT_MAX_ROLLUP_SIZE},
    ChainConfig,
};

/// The configuration of an enclave node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnclaveConfig {
    /// The parameters of the L2 chain.
    pub chain: ChainConfig,
    /// The id of this enclave.
    pub enclave_id: Address,
    /// The enclave id of the sequencer, whose attested key signs batches and rollups.
    pub sequencer_id: Address,
    /// The maximum encoded size of the transactions of a batch.
    pub max_batch_size: usize,
    /// The maximum encoded size of a rollup.
    pub max_rollup_size: usize,
}

impl Default for EnclaveConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            enclave_id: Address::ZERO,
            sequencer_id: Address::ZERO,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_rollup_size: DEFAULT_MAX_ROLLUP_SIZE,
        }
    }
}
