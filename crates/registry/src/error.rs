use enclave_db::DatabaseError;

/// An error that occurred in the [`super::BatchRegistry`].
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The stored batches do not form a gap-free sequence.
    #[error("non consecutive batches: expected sequence number {expected}, got {got}")]
    NonConsecutiveBatches {
        /// The expected sequence number.
        expected: u64,
        /// The sequence number found.
        got: u64,
    },
    /// No batch was executed yet.
    #[error("no head batch")]
    NoHeadBatch,
    /// The head batch is older than the tolerated age.
    #[error("head batch {seq_no} is stale: {age}s old")]
    StaleHeadBatch {
        /// The sequence number of the head batch.
        seq_no: u64,
        /// The age of the head batch in seconds.
        age: u64,
    },
    /// A database error occurred.
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl RegistryError {
    /// Returns true if the requested data is not stored yet.
    pub const fn is_not_found(&self) -> bool {
        match self {
            Self::NoHeadBatch => true,
            Self::Database(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Returns true if the error reveals corrupted storage or a logic error.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NonConsecutiveBatches { .. } | Self::Database(DatabaseError::Inconsistent(_))
        )
    }
}
