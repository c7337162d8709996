use crate::NodeType;

use alloy_primitives::B256;
use enclave_block_processor::BlockProcessorError;
use enclave_db::DatabaseError;
use enclave_executor::ExecutorError;
use enclave_mempool::MempoolError;
use enclave_registry::RegistryError;
use enclave_rollup::RollupError;
use enclave_signer::SignerError;

/// An error that occurred in an enclave node.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// An error occurred while ingesting an L1 block.
    #[error(transparent)]
    BlockProcessor(#[from] BlockProcessorError),
    /// An error occurred while computing or executing a batch.
    #[error(transparent)]
    Executor(#[from] ExecutorError),
    /// An error occurred in the batch registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// An error occurred while producing or consuming a rollup.
    #[error(transparent)]
    Rollup(#[from] RollupError),
    /// An error occurred while signing or validating a signature.
    #[error(transparent)]
    Signer(#[from] SignerError),
    /// A transaction was rejected by the mempool.
    #[error(transparent)]
    Mempool(#[from] MempoolError),
    /// A database error occurred.
    #[error(transparent)]
    Database(#[from] DatabaseError),
    /// The operation is reserved to another node type.
    #[error("{operation} is not supported by a {node_type:?} node")]
    Unsupported {
        /// The refused operation.
        operation: &'static str,
        /// The type of the node.
        node_type: NodeType,
    },
    /// The ancestral batch of the L1 head is above the head batch.
    #[error("ancestral batch {hash} at height {ancestral} is above the head batch at height {head}")]
    AncestralAboveHead {
        /// The hash of the ancestral batch.
        hash: B256,
        /// The height of the ancestral batch.
        ancestral: u64,
        /// The height of the head batch.
        head: u64,
    },
    /// The task owning the node stopped.
    #[error("enclave task stopped")]
    Shutdown,
}

impl NodeError {
    /// Returns true if the referenced data is not known yet and the call can be retried later.
    pub const fn is_not_found(&self) -> bool {
        match self {
            Self::BlockProcessor(err) => err.is_not_found(),
            Self::Executor(err) => err.is_not_found(),
            Self::Registry(err) => err.is_not_found(),
            Self::Rollup(err) => err.is_not_found(),
            Self::Signer(err) => err.is_not_found(),
            Self::Database(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Returns true if the call was an idempotent repetition.
    pub const fn is_duplicate(&self) -> bool {
        match self {
            Self::BlockProcessor(err) => err.is_duplicate(),
            Self::Rollup(err) => err.is_duplicate(),
            Self::Mempool(err) => err.is_duplicate(),
            _ => false,
        }
    }

    /// Returns true if the error reveals corrupted storage or a logic error.
    pub const fn is_fatal(&self) -> bool {
        match self {
            Self::BlockProcessor(err) => err.is_fatal(),
            Self::Executor(err) => err.is_fatal(),
            Self::Registry(err) => err.is_fatal(),
            Self::Rollup(err) => err.is_fatal(),
            Self::Database(err) => matches!(err, DatabaseError::Inconsistent(_)),
            Self::AncestralAboveHead { .. } => true,
            _ => false,
        }
    }
}
