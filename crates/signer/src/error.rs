use alloy_primitives::{Address, SignatureError};
use enclave_db::DatabaseError;

/// An enum representing the errors that can occur while signing or validating signatures.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// An error occurred while signing.
    #[error("Failed to sign: {0}")]
    SigningError(#[from] alloy_signer::Error),
    /// The header carries no signature.
    #[error("Missing signature")]
    MissingSignature,
    /// No address could be recovered from the signature.
    #[error("Invalid signature: {0}")]
    InvalidSignature(#[from] SignatureError),
    /// The header was signed by another key than the attested sequencer key.
    #[error("Signed by {recovered}, expected the sequencer key {expected}")]
    UnexpectedSigner {
        /// The attested key of the sequencer.
        expected: Address,
        /// The recovered signer.
        recovered: Address,
    },
    /// A database error occurred, for example the sequencer key is not attested yet.
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl SignerError {
    /// Returns true if the sequencer key is not known yet.
    pub const fn is_not_found(&self) -> bool {
        match self {
            Self::Database(err) => err.is_not_found(),
            _ => false,
        }
    }
}
