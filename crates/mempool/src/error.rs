use alloy_primitives::{SignatureError, B256};
use enclave_db::DatabaseError;

/// An error that occurred in the [`super::Mempool`].
#[derive(Debug, thiserror::Error)]
pub enum MempoolError {
    /// The sender of the transaction could not be recovered.
    #[error("invalid transaction signature: {0}")]
    InvalidSignature(#[from] SignatureError),
    /// The transaction targets another chain.
    #[error("invalid chain id: expected {expected}, got {got}")]
    InvalidChainId {
        /// The chain id of the enclave.
        expected: u64,
        /// The chain id of the transaction.
        got: u64,
    },
    /// The transaction is already in the pool.
    #[error("transaction {0} already known")]
    AlreadyKnown(B256),
    /// A database error occurred.
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl MempoolError {
    /// Returns true if the transaction was submitted before.
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::AlreadyKnown(_))
    }
}
