use crate::{ConsumerMetrics, RollupError};

use alloy_primitives::Address;
use enclave_db::DatabaseWriteOperations;
use enclave_executor::{BatchExecutor, TransactionExecutor};
use enclave_l1::ManagementContractTx;
use enclave_primitives::{Batch, BlockAndReceipts, Receipt, Rollup};
use enclave_registry::BatchRegistry;
use enclave_signer::SignatureValidator;
use std::sync::Arc;

/// Extracts the rollups published on L1 and replays the batches they carry.
#[derive(Debug)]
pub struct RollupConsumer<DB, E> {
    db: DB,
    executor: Arc<BatchExecutor<DB, E>>,
    registry: Arc<BatchRegistry<DB>>,
    validator: SignatureValidator<DB>,
    management_contract: Address,
    metrics: ConsumerMetrics,
}

impl<DB, E> RollupConsumer<DB, E>
where
    DB: DatabaseWriteOperations,
    E: TransactionExecutor,
{
    /// Returns a new [`RollupConsumer`].
    pub fn new(
        db: DB,
        executor: Arc<BatchExecutor<DB, E>>,
        registry: Arc<BatchRegistry<DB>>,
        validator: SignatureValidator<DB>,
        management_contract: Address,
    ) -> Self {
        Self {
            db,
            executor,
            registry,
            validator,
            management_contract,
            metrics: ConsumerMetrics::default(),
        }
    }

    /// Consumes the rollup published in the block, if any, and returns it.
    ///
    /// Rollups with an invalid signature are ignored. A block carrying more than one signed
    /// rollup is rejected as a whole.
    pub fn process_l1_block(
        &self,
        block: &BlockAndReceipts,
    ) -> Result<Option<Rollup>, RollupError> {
        let mut signed = Vec::new();
        for tx in block.successful_transactions() {
            let Some(ManagementContractTx::Rollup(rollup)) =
                ManagementContractTx::try_decode(tx, self.management_contract)
            else {
                continue;
            };
            match self.validator.check_sequencer_signature(rollup.hash(), rollup.signature.as_ref()) {
                Ok(()) => signed.push(rollup),
                Err(err) if err.is_not_found() => return Err(err.into()),
                Err(_) => {}
            }
        }

        let hash = block.block.hash();
        let rollup = match signed.len() {
            0 => return Ok(None),
            1 => signed.remove(0),
            count => {
                tracing::warn!(target: "enclave::rollup", block = ?hash, count, "Rejecting block with multiple signed rollups");
                self.metrics.rejected_rollups.increment(count as u64);
                return Err(RollupError::MultipleRollups { block: hash, count });
            }
        };

        self.process_rollup(&rollup).inspect_err(|err| {
            if !err.is_duplicate() {
                tracing::warn!(target: "enclave::rollup", hash = ?rollup.hash(), %err, "Rejected rollup");
                self.metrics.rejected_rollups.increment(1);
            }
        })?;
        Ok(Some(rollup))
    }

    /// Replays the batches of a rollup that are not known yet, then stores the rollup.
    pub fn process_rollup(&self, rollup: &Rollup) -> Result<(), RollupError> {
        let hash = rollup.hash();
        match self.db.fetch_rollup(hash) {
            Ok(_) => return Err(RollupError::DuplicateRollup(hash)),
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err.into()),
        }
        if !rollup.is_contiguous() {
            return Err(RollupError::NonContiguousRollup(hash));
        }
        if Rollup::payload_hash(&rollup.batches) != rollup.header.payload_hash {
            return Err(RollupError::PayloadMismatch(hash));
        }

        for batch in &rollup.batches {
            let batch_hash = batch.hash();
            match self.db.fetch_batch(batch_hash) {
                Ok(_) => {
                    self.metrics.skipped_batches.increment(1);
                    continue;
                }
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err.into()),
            }
            match self.db.fetch_block(batch.l1_proof()) {
                Ok(_) => {}
                Err(err) if err.is_not_found() => {
                    tracing::debug!(target: "enclave::rollup", hash = ?batch_hash, l1_proof = ?batch.l1_proof(), "Skipping batch anchored to an unknown block");
                    self.metrics.skipped_batches.increment(1);
                    continue;
                }
                Err(err) => return Err(err.into()),
            }

            let receipts = self.executor.execute_batch(batch)?;
            self.store_executed_batch(batch, &receipts)?;
            self.metrics.executed_batches.increment(1);
        }

        self.db.store_rollup(rollup)?;
        self.metrics.consumed_rollups.increment(1);
        tracing::info!(
            target: "enclave::rollup",
            ?hash,
            first_seq_no = rollup.header.first_batch_seq_no,
            last_seq_no = rollup.header.last_batch_seq_no,
            "Consumed rollup"
        );
        Ok(())
    }

    /// Stores a validated batch. It becomes the head if it is the newest batch.
    pub fn store_executed_batch(&self, batch: &Batch, receipts: &[Receipt]) -> Result<(), RollupError> {
        self.db.store_batch(batch, receipts)?;
        if self.registry.head_batch_seq().is_none_or(|head| batch.seq_no() > head) {
            self.db.update_head_batch(batch.hash())?;
            self.registry.on_batch_executed(batch, receipts);
        }
        Ok(())
    }
}
