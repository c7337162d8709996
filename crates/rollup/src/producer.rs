use crate::{ProducerMetrics, RollupError};

use alloy_primitives::B256;
use enclave_db::DatabaseReadOperations;
use enclave_primitives::{Rollup, RollupHeader, RollupLimiter};
use enclave_registry::BatchRegistry;
use enclave_signer::EnclaveSigner;
use std::sync::Arc;

/// Packs runs of consecutive batches into signed rollups.
#[derive(Debug)]
pub struct RollupProducer<DB> {
    db: DB,
    registry: Arc<BatchRegistry<DB>>,
    signer: EnclaveSigner,
    metrics: ProducerMetrics,
}

impl<DB: DatabaseReadOperations> RollupProducer<DB> {
    /// Returns a new [`RollupProducer`].
    pub fn new(db: DB, registry: Arc<BatchRegistry<DB>>, signer: EnclaveSigner) -> Self {
        Self { db, registry, signer, metrics: ProducerMetrics::default() }
    }

    /// Returns a signed rollup of the batches from `from_seq` upwards that are anchored at most
    /// at `upto_l1_height` and accepted by `limiter`. The rollup links to the latest stored
    /// rollup.
    pub fn create_rollup(
        &self,
        from_seq: u64,
        upto_l1_height: u64,
        limiter: &mut dyn RollupLimiter,
    ) -> Result<Rollup, RollupError> {
        let (batches, blocks) = self.registry.batches_after(from_seq, upto_l1_height, limiter)?;
        let (Some(first), Some(last), Some(block)) = (batches.first(), batches.last(), blocks.last())
        else {
            return Err(RollupError::NoBatches(from_seq));
        };

        let parent_hash = match self.db.fetch_latest_rollup() {
            Ok(rollup) => rollup.hash(),
            Err(err) if err.is_not_found() => B256::ZERO,
            Err(err) => return Err(err.into()),
        };
        let header = RollupHeader {
            parent_hash,
            l1_proof: block.hash(),
            l1_proof_number: block.number(),
            coinbase: last.header.coinbase,
            first_batch_seq_no: first.seq_no(),
            last_batch_seq_no: last.seq_no(),
            head_batch_hash: last.hash(),
            payload_hash: Rollup::payload_hash(&batches),
        };

        let count = batches.len();
        let rollup = self.signer.sign_rollup(Rollup { header, signature: None, batches })?;
        tracing::info!(
            target: "enclave::rollup",
            hash = ?rollup.hash(),
            first_seq_no = rollup.header.first_batch_seq_no,
            last_seq_no = rollup.header.last_batch_seq_no,
            "Produced rollup"
        );
        self.metrics.produced_rollups.increment(1);
        self.metrics.rolled_up_batches.increment(count as u64);
        Ok(rollup)
    }
}
