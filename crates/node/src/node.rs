use crate::{NodeError, NodeType};

use alloy_primitives::B256;
use enclave_block_processor::BlockIngestion;
use enclave_primitives::{Batch, BlockAndReceipts, BlockInfo, L2Transaction, Rollup};

/// The outcome of submitting an L1 block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSubmissionResponse {
    /// The ingestion of the block.
    pub ingestion: BlockIngestion,
    /// The hash of the rollup consumed from the block, if any.
    pub consumed_rollup: Option<B256>,
}

/// A snapshot of the node heads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnclaveStatus {
    /// The type of the node.
    pub node_type: NodeType,
    /// The head of the ingested L1 chain.
    pub l1_head: Option<BlockInfo>,
    /// The hash of the head batch.
    pub head_batch: Option<B256>,
    /// The sequence number of the head batch.
    pub head_batch_seq: Option<u64>,
}

/// The operations an enclave exposes to its host.
///
/// The operations reserved to the other node type fail with [`NodeError::Unsupported`].
pub trait EnclaveNode: Send + 'static {
    /// Returns the type of the node.
    fn node_type(&self) -> NodeType;

    /// Ingests an L1 block and consumes the rollup it carries.
    fn submit_l1_block(
        &self,
        block: &BlockAndReceipts,
        is_latest: bool,
    ) -> Result<BlockSubmissionResponse, NodeError>;

    /// Adds a transaction to the mempool and returns its hash.
    fn submit_tx(&self, tx: L2Transaction) -> Result<B256, NodeError>;

    /// Validates and stores a batch received directly from the sequencer.
    fn submit_batch(&self, batch: &Batch) -> Result<(), NodeError>;

    /// Creates the next batch. Returns `None` if `skip_if_empty` is set and no transaction is
    /// pending.
    fn create_batch(&self, skip_if_empty: bool) -> Result<Option<Batch>, NodeError>;

    /// Creates a rollup of the batches from `from_seq` upwards, or of the batches following the
    /// latest stored rollup if `from_seq` is `None`.
    fn create_rollup(&self, from_seq: Option<u64>) -> Result<Rollup, NodeError>;

    /// Returns the head batch.
    fn head_batch(&self) -> Result<Option<Batch>, NodeError>;

    /// Returns the node status.
    fn status(&self) -> Result<EnclaveStatus, NodeError>;
}
