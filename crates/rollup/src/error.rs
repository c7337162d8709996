use alloy_primitives::B256;
use enclave_db::DatabaseError;
use enclave_executor::ExecutorError;
use enclave_registry::RegistryError;
use enclave_signer::SignerError;

/// An error that occurred while producing or consuming rollups.
#[derive(Debug, thiserror::Error)]
pub enum RollupError {
    /// There are no batches to put in a rollup.
    #[error("no batches to roll up from sequence number {0}")]
    NoBatches(u64),
    /// The rollup was consumed before.
    #[error("duplicate rollup {0}")]
    DuplicateRollup(B256),
    /// An L1 block carries more than one signed rollup.
    #[error("block {block} contains {count} signed rollups")]
    MultipleRollups {
        /// The hash of the L1 block.
        block: B256,
        /// The number of signed rollups in the block.
        count: usize,
    },
    /// The batches of the rollup are not consecutive or do not match the header range.
    #[error("rollup {0} is not contiguous")]
    NonContiguousRollup(B256),
    /// The batches of the rollup do not match the header commitment.
    #[error("rollup {0} payload does not match its header")]
    PayloadMismatch(B256),
    /// A signing or signature validation error occurred.
    #[error(transparent)]
    Signer(#[from] SignerError),
    /// A batch of the rollup could not be executed.
    #[error(transparent)]
    Executor(#[from] ExecutorError),
    /// A registry error occurred.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A database error occurred.
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl RollupError {
    /// Returns true if the rollup was consumed before. Callers treat this as a no-op.
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateRollup(_))
    }

    /// Returns true if data the operation depends on is not ingested yet.
    pub const fn is_not_found(&self) -> bool {
        match self {
            Self::NoBatches(_) => true,
            Self::Signer(err) => err.is_not_found(),
            Self::Executor(err) => err.is_not_found(),
            Self::Registry(err) => err.is_not_found(),
            Self::Database(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Returns true if the error reveals corrupted storage or a logic error.
    pub const fn is_fatal(&self) -> bool {
        match self {
            Self::Executor(err) => err.is_fatal(),
            Self::Registry(err) => err.is_fatal(),
            Self::Database(DatabaseError::Inconsistent(_)) => true,
            _ => false,
        }
    }
}
