use alloy_primitives::B256;
use enclave_db::DatabaseError;

/// An error that occurred while computing or executing a batch.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// The L1 block the batch is anchored to is not stored yet.
    #[error("L1 block {0} for batch not found")]
    BlockForBatchNotFound(B256),
    /// The parent batch is not stored yet.
    #[error("ancestor batch {0} not found")]
    AncestorBatchNotFound(B256),
    /// A synthetic transaction was not executed successfully.
    #[error("synthetic transaction {0} failed")]
    SyntheticTransactionFailed(B256),
    /// The recomputed batch differs from the provided one.
    #[error("batch is in invalid state: expected hash {expected}, computed {computed}")]
    InvalidBatch {
        /// The hash of the provided batch.
        expected: B256,
        /// The hash of the recomputed batch.
        computed: B256,
    },
    /// The committed state root differs from the root of the batch.
    #[error("committed state root {committed} differs from batch root {expected}")]
    StateRootMismatch {
        /// The root declared by the batch.
        expected: B256,
        /// The root of the committed state.
        committed: B256,
    },
    /// A database error occurred.
    #[error(transparent)]
    Database(#[from] DatabaseError),
    /// The enclave system key could not be loaded.
    #[error("invalid system key: {0}")]
    SystemKey(#[from] alloy_signer_local::LocalSignerError),
    /// Signing a synthetic transaction failed.
    #[error("failed to sign synthetic transaction: {0}")]
    Signer(#[from] alloy_signer::Error),
}

impl ExecutorError {
    /// Returns true if the error is caused by data that has not been ingested yet. The operation
    /// can be retried later.
    pub const fn is_not_found(&self) -> bool {
        match self {
            Self::BlockForBatchNotFound(_) | Self::AncestorBatchNotFound(_) => true,
            Self::Database(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Returns true if the error reveals an internal inconsistency: corrupted storage or a logic
    /// error.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SyntheticTransactionFailed(_) |
                Self::StateRootMismatch { .. } |
                Self::Database(DatabaseError::Inconsistent(_))
        )
    }
}
