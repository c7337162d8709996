use alloy_primitives::{Address, B256};

/// The error type for database operations.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// The requested entry is not in the database.
    #[error("{0} not found in database")]
    NotFound(NotFound),
    /// The database content contradicts itself.
    #[error("inconsistent database: {0}")]
    Inconsistent(String),
}

impl DatabaseError {
    /// Returns true if the error is a [`DatabaseError::NotFound`].
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<NotFound> for DatabaseError {
    fn from(value: NotFound) -> Self {
        Self::NotFound(value)
    }
}

/// The key of an entry missing from the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NotFound {
    /// An L1 block by hash.
    #[error("block {0}")]
    Block(B256),
    /// The L1 head block.
    #[error("head block")]
    HeadBlock,
    /// A canonical L1 block by height.
    #[error("canonical block at height {0}")]
    CanonicalBlock(u64),
    /// A batch by hash.
    #[error("batch {0}")]
    Batch(B256),
    /// A batch by sequencer order number.
    #[error("batch with sequence number {0}")]
    BatchBySeqNo(u64),
    /// A canonical batch by height.
    #[error("batch at height {0}")]
    BatchByHeight(u64),
    /// The head batch.
    #[error("head batch")]
    HeadBatch,
    /// The head batch recorded for an L1 block.
    #[error("head batch for block {0}")]
    HeadBatchForBlock(B256),
    /// The receipts of a batch.
    #[error("receipts of batch {0}")]
    Receipts(B256),
    /// A state snapshot by root.
    #[error("state {0}")]
    State(B256),
    /// A rollup by hash.
    #[error("rollup {0}")]
    Rollup(B256),
    /// The latest stored rollup.
    #[error("latest rollup")]
    LatestRollup,
    /// The attested key of an enclave.
    #[error("attested key of {0}")]
    AttestedKey(Address),
}
