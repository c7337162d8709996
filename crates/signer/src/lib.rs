//! Signing and signature validation of the artifacts produced by the sequencer.
//!
//! The [`EnclaveSigner`] is generic and can use any synchronous signer from the `alloy_signer`
//! crate. It signs the header hash of batches and rollups directly. The [`SignatureValidator`]
//! checks those signatures against the attested key of the sequencer.

use alloy_primitives::{Address, Signature, B256};
use alloy_signer::SignerSync;
use enclave_db::DatabaseReadOperations;
use enclave_primitives::{Batch, Rollup};
use parking_lot::Mutex;
use std::{sync::Arc, time::Instant};

mod error;
pub use error::SignerError;

mod metrics;
pub use metrics::{SignerMetrics, ValidatorMetrics};

/// The signer of the sequencer enclave.
#[derive(Clone)]
pub struct EnclaveSigner {
    /// The signer instance.
    signer: Arc<dyn SignerSync<Signature> + Send + Sync>,
    /// The address of the signer.
    address: Address,
    /// The signer metrics.
    metrics: SignerMetrics,
}

impl EnclaveSigner {
    /// Returns a new [`EnclaveSigner`] from the provided signer.
    pub fn new<S>(signer: S) -> Self
    where
        S: SignerSync<Signature> + alloy_signer::Signer<Signature> + Send + Sync + 'static,
    {
        let address = alloy_signer::Signer::address(&signer);
        Self { signer: Arc::new(signer), address, metrics: SignerMetrics::default() }
    }

    /// Returns the address of the signer.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Signs the header hash of the batch.
    pub fn sign_batch(&self, mut batch: Batch) -> Result<Batch, SignerError> {
        batch.signature = Some(self.sign_hash(batch.hash())?);
        Ok(batch)
    }

    /// Signs the header hash of the rollup.
    pub fn sign_rollup(&self, mut rollup: Rollup) -> Result<Rollup, SignerError> {
        rollup.signature = Some(self.sign_hash(rollup.hash())?);
        Ok(rollup)
    }

    fn sign_hash(&self, hash: B256) -> Result<Signature, SignerError> {
        let now = Instant::now();
        let signature = self.signer.sign_hash_sync(&hash)?;
        self.metrics.signing_duration.record(now.elapsed().as_secs_f64());
        Ok(signature)
    }
}

impl std::fmt::Debug for EnclaveSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnclaveSigner")
            .field("signer", &"alloy_signer::SignerSync")
            .field("address", &self.address)
            .finish()
    }
}

/// Validates that headers were signed by the attested key of the sequencer.
///
/// The key is read from storage on first use and cached afterwards.
#[derive(Debug)]
pub struct SignatureValidator<DB> {
    /// The storage holding the attested keys.
    db: DB,
    /// The enclave id of the sequencer.
    sequencer_id: Address,
    /// The cached attested key of the sequencer.
    sequencer_key: Mutex<Option<Address>>,
    /// The validator metrics.
    metrics: ValidatorMetrics,
}

impl<DB: DatabaseReadOperations> SignatureValidator<DB> {
    /// Returns a new [`SignatureValidator`] for the sequencer with the provided enclave id.
    pub fn new(db: DB, sequencer_id: Address) -> Self {
        Self {
            db,
            sequencer_id,
            sequencer_key: Mutex::new(None),
            metrics: ValidatorMetrics::default(),
        }
    }

    /// Returns the attested key of the sequencer.
    pub fn sequencer_key(&self) -> Result<Address, SignerError> {
        let mut cached = self.sequencer_key.lock();
        if let Some(key) = *cached {
            return Ok(key);
        }
        let key = self.db.fetch_attested_key(self.sequencer_id)?;
        *cached = Some(key);
        Ok(key)
    }

    /// Checks that `signature` over `hash` was produced by the sequencer.
    pub fn check_sequencer_signature(
        &self,
        hash: B256,
        signature: Option<&Signature>,
    ) -> Result<(), SignerError> {
        let result = self.verify(hash, signature);
        if let Err(err) = &result {
            tracing::warn!(target: "enclave::signer", ?hash, ?err, "Invalid sequencer signature");
            self.metrics.rejected_signatures.increment(1);
        }
        result
    }

    fn verify(&self, hash: B256, signature: Option<&Signature>) -> Result<(), SignerError> {
        let signature = signature.ok_or(SignerError::MissingSignature)?;
        let expected = self.sequencer_key()?;
        let recovered = signature.recover_address_from_prehash(&hash)?;
        if recovered != expected {
            return Err(SignerError::UnexpectedSigner { expected, recovered });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_signer_local::PrivateKeySigner;
    use enclave_db::{Database, DatabaseWriteOperations};
    use enclave_primitives::{BatchHeader, RollupHeader};

    const SEQUENCER_ID: Address = Address::repeat_byte(0x11);

    fn setup() -> (EnclaveSigner, SignatureValidator<Database>) {
        let signer = EnclaveSigner::new(PrivateKeySigner::random());
        let db = Database::new();
        db.store_attested_key(SEQUENCER_ID, signer.address()).unwrap();
        (signer, SignatureValidator::new(db, SEQUENCER_ID))
    }

    #[test]
    fn test_signed_batch_is_accepted() {
        let (signer, validator) = setup();
        let batch = Batch {
            header: BatchHeader { number: 3, sequencer_order_no: 4, ..Default::default() },
            ..Default::default()
        };

        let signed = signer.sign_batch(batch.clone()).unwrap();
        assert_eq!(signed.hash(), batch.hash());
        validator.check_sequencer_signature(signed.hash(), signed.signature.as_ref()).unwrap();
    }

    #[test]
    fn test_missing_signature_is_rejected() {
        let (_, validator) = setup();
        let err = validator.check_sequencer_signature(B256::ZERO, None).unwrap_err();
        assert!(matches!(err, SignerError::MissingSignature));
    }

    #[test]
    fn test_foreign_signer_is_rejected() {
        let (_, validator) = setup();
        let intruder = EnclaveSigner::new(PrivateKeySigner::random());
        let rollup = Rollup {
            header: RollupHeader { first_batch_seq_no: 2, ..Default::default() },
            ..Default::default()
        };

        let signed = intruder.sign_rollup(rollup).unwrap();
        let err = validator
            .check_sequencer_signature(signed.hash(), signed.signature.as_ref())
            .unwrap_err();
        assert!(matches!(err, SignerError::UnexpectedSigner { .. }));
    }

    #[test]
    fn test_unknown_sequencer_key() {
        let validator = SignatureValidator::new(Database::new(), SEQUENCER_ID);
        let signer = EnclaveSigner::new(PrivateKeySigner::random());
        let signed = signer.sign_batch(Batch::default()).unwrap();

        let err = validator
            .check_sequencer_signature(signed.hash(), signed.signature.as_ref())
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
