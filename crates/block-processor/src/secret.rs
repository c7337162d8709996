use crate::BlockProcessorError;

use alloy_primitives::{Address, Bytes};
use enclave_db::DatabaseWriteOperations;
use enclave_l1::{AttestationReport, ManagementContractTx, RespondSecretTx};
use enclave_primitives::BlockAndReceipts;

/// The reason an attestation report was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("attestation rejected: {0}")]
pub struct AttestationError(pub String);

/// Verifies the attestation reports published on L1.
#[auto_impl::auto_impl(&, Arc, Box)]
pub trait AttestationVerifier: Send + Sync {
    /// Checks that `report` proves the enclave runs the expected code.
    fn verify(&self, report: &AttestationReport) -> Result<(), AttestationError>;
}

/// Processes the network secret control messages carried by L1 blocks.
///
/// Initializations and verified secret requests register the attested signing key of the
/// publishing enclave. The responses to the requests are returned to the host, which seals the
/// network secret for the requester.
#[derive(Debug)]
pub struct SharedSecretProcessor<DB, V> {
    db: DB,
    verifier: V,
    /// The enclave id used in the responses.
    enclave_id: Address,
    management_contract: Address,
}

impl<DB, V> SharedSecretProcessor<DB, V>
where
    DB: DatabaseWriteOperations,
    V: AttestationVerifier,
{
    /// Returns a new [`SharedSecretProcessor`].
    pub const fn new(db: DB, verifier: V, enclave_id: Address, management_contract: Address) -> Self {
        Self { db, verifier, enclave_id, management_contract }
    }

    /// Processes the control messages of the successful transactions of the block and returns the
    /// responses to the secret requests.
    pub fn process_network_secret_msgs(
        &self,
        block: &BlockAndReceipts,
    ) -> Result<Vec<RespondSecretTx>, BlockProcessorError> {
        let mut responses = Vec::new();
        for tx in block.successful_transactions() {
            match ManagementContractTx::try_decode(tx, self.management_contract) {
                Some(ManagementContractTx::InitializeSecret(init)) => {
                    if self.register(&init.attestation)? {
                        tracing::info!(target: "enclave::block_processor", enclave_id = ?init.enclave_id, "Network secret initialized");
                    }
                }
                Some(ManagementContractTx::RequestSecret(request)) => {
                    if self.register(&request.attestation)? {
                        responses.push(RespondSecretTx {
                            attester_id: self.enclave_id,
                            requester_id: request.attestation.enclave_id,
                            attester_sig: Bytes::new(),
                            response_secret: Bytes::new(),
                        });
                    }
                }
                Some(ManagementContractTx::RespondSecret(response)) => {
                    tracing::debug!(target: "enclave::block_processor", requester_id = ?response.requester_id, attester_id = ?response.attester_id, "Observed secret response");
                }
                Some(ManagementContractTx::Rollup(_)) | None => {}
            }
        }
        Ok(responses)
    }

    /// Stores the attested key if the report verifies. Returns false for rejected reports.
    fn register(&self, report: &AttestationReport) -> Result<bool, BlockProcessorError> {
        if let Err(err) = self.verifier.verify(report) {
            tracing::warn!(target: "enclave::block_processor", enclave_id = ?report.enclave_id, %err, "Ignoring control message with invalid attestation");
            return Ok(false);
        }
        self.db.store_attested_key(report.enclave_id, report.signing_key)?;
        Ok(true)
    }
}
