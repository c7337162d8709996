use alloy_primitives::B256;
use enclave_db::DatabaseError;

/// An error that occurred while ingesting an L1 block.
#[derive(Debug, thiserror::Error)]
pub enum BlockProcessorError {
    /// The block was ingested before.
    #[error("block {0} already processed")]
    BlockAlreadyProcessed(B256),
    /// An ancestor of the block is not stored, the chain cannot be resolved.
    #[error("block ancestor {0} not found")]
    BlockAncestorNotFound(B256),
    /// The walk reached L1 genesis on both branches without finding a common block.
    #[error("no common ancestor between {new} and {old}")]
    NoCommonAncestor {
        /// The ingested block.
        new: B256,
        /// The previous head block.
        old: B256,
    },
    /// A database error occurred.
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl BlockProcessorError {
    /// Returns true if the block was already ingested. Callers treat this as a no-op.
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::BlockAlreadyProcessed(_))
    }

    /// Returns true if part of the chain is not ingested yet.
    pub const fn is_not_found(&self) -> bool {
        match self {
            Self::BlockAncestorNotFound(_) => true,
            Self::Database(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Returns true if the error reveals corrupted storage or a logic error.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::NoCommonAncestor { .. } | Self::Database(DatabaseError::Inconsistent(_)))
    }
}
