use crate::{
    BlockSubmissionResponse, EnclaveComponents, EnclaveNode, EnclaveStatus, NodeError, NodeType,
    ValidatorMetrics,
};

use alloy_primitives::B256;
use enclave_block_processor::AttestationVerifier;
use enclave_db::DatabaseWriteOperations;
use enclave_executor::TransactionExecutor;
use enclave_primitives::{Batch, BlockAndReceipts, L2Transaction, Rollup};
use enclave_signer::SignatureValidator;

/// The [`Validator`] recomputes the batches produced by the sequencer.
///
/// Batches reach it through the rollups published on L1 and, ahead of publication, directly from
/// the sequencer host. Both paths only keep batches whose recomputation matches.
#[derive(Debug)]
pub struct Validator<DB, E, V> {
    components: EnclaveComponents<DB, E, V>,
    signatures: SignatureValidator<DB>,
    metrics: ValidatorMetrics,
}

impl<DB, E, V> Validator<DB, E, V>
where
    DB: DatabaseWriteOperations + Clone,
    E: TransactionExecutor,
    V: AttestationVerifier,
{
    /// Returns a new [`Validator`].
    pub fn new(components: EnclaveComponents<DB, E, V>) -> Self {
        let signatures =
            SignatureValidator::new(components.db.clone(), components.config.sequencer_id);
        Self { components, signatures, metrics: ValidatorMetrics::default() }
    }

    /// Returns the shared components.
    pub const fn components(&self) -> &EnclaveComponents<DB, E, V> {
        &self.components
    }

    /// Validates a batch signed by the sequencer and stores it. A batch that was already stored
    /// is accepted without being executed again.
    pub fn submit_batch(&self, batch: &Batch) -> Result<(), NodeError> {
        let _guard = self.components.lock_ingestion();
        let hash = batch.hash();
        match self.components.db.fetch_batch(hash) {
            Ok(_) => {
                tracing::trace!(target: "enclave::validator", ?hash, "Batch already stored");
                return Ok(());
            }
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err.into()),
        }

        self.signatures.check_sequencer_signature(hash, batch.signature.as_ref())?;
        let receipts = self.components.executor.execute_batch(batch).inspect_err(|err| {
            if !err.is_not_found() {
                tracing::warn!(target: "enclave::validator", ?hash, %err, "Rejected batch");
                self.metrics.rejected_batches.increment(1);
            }
        })?;
        self.components.rollup_consumer.store_executed_batch(batch, &receipts)?;
        self.metrics.submitted_batches.increment(1);

        tracing::debug!(target: "enclave::validator", ?hash, seq_no = batch.seq_no(), "Stored submitted batch");
        Ok(())
    }
}

impl<DB, E, V> EnclaveNode for Validator<DB, E, V>
where
    DB: DatabaseWriteOperations + Clone + Send + Sync + 'static,
    E: TransactionExecutor + 'static,
    V: AttestationVerifier + 'static,
{
    fn node_type(&self) -> NodeType {
        NodeType::Validator
    }

    fn submit_l1_block(
        &self,
        block: &BlockAndReceipts,
        is_latest: bool,
    ) -> Result<BlockSubmissionResponse, NodeError> {
        self.components.ingest_block(block, is_latest)
    }

    fn submit_tx(&self, _tx: L2Transaction) -> Result<B256, NodeError> {
        Err(NodeError::Unsupported { operation: "submit_tx", node_type: NodeType::Validator })
    }

    fn submit_batch(&self, batch: &Batch) -> Result<(), NodeError> {
        Self::submit_batch(self, batch)
    }

    fn create_batch(&self, _skip_if_empty: bool) -> Result<Option<Batch>, NodeError> {
        Err(NodeError::Unsupported { operation: "create_batch", node_type: NodeType::Validator })
    }

    fn create_rollup(&self, _from_seq: Option<u64>) -> Result<Rollup, NodeError> {
        Err(NodeError::Unsupported { operation: "create_rollup", node_type: NodeType::Validator })
    }

    fn head_batch(&self) -> Result<Option<Batch>, NodeError> {
        self.components.head_batch()
    }

    fn status(&self) -> Result<EnclaveStatus, NodeError> {
        self.components.status(NodeType::Validator)
    }
}
