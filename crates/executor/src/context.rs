use alloy_primitives::{Address, B256};
use enclave_primitives::{Batch, L2Transaction};

/// Everything a batch computation depends on besides the stored chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchExecutionContext {
    /// The hash of the L1 block the batch is anchored to.
    pub block_hash: B256,
    /// The hash of the parent batch.
    pub parent_hash: B256,
    /// The ordinary transactions to execute, in order.
    pub transactions: Vec<L2Transaction>,
    /// The batch timestamp.
    pub at_time: u64,
    /// The batch randomness.
    pub randomness: B256,
    /// The sequencer fee recipient.
    pub creator: Address,
    /// The sequencer order number of the batch.
    pub seq_no: u64,
}

impl From<&Batch> for BatchExecutionContext {
    fn from(batch: &Batch) -> Self {
        Self {
            block_hash: batch.l1_proof(),
            parent_hash: batch.parent_hash(),
            transactions: batch.transactions.clone(),
            at_time: batch.header.time,
            randomness: batch.header.mix_digest,
            creator: batch.header.coinbase,
            seq_no: batch.seq_no(),
        }
    }
}
