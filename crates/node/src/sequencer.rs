use crate::{
    BlockSubmissionResponse, EnclaveComponents, EnclaveNode, EnclaveStatus, NodeError, NodeType,
    SequencerMetrics,
};

use alloy_primitives::B256;
use enclave_block_processor::AttestationVerifier;
use enclave_db::DatabaseWriteOperations;
use enclave_executor::{BatchExecutionContext, TransactionExecutor};
use enclave_mempool::Mempool;
use enclave_primitives::{
    constants::L2_GENESIS_SEQ_NO, Batch, BatchSizeLimiter, BlockAndReceipts, L1Block,
    L2Transaction, Receipt, Receipts, Rollup, RollupSizeLimiter,
};
use enclave_rollup::RollupProducer;
use enclave_signer::EnclaveSigner;
use parking_lot::Mutex;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// The [`Sequencer`] orders the transactions of its mempool into batches and packs the batches
/// into rollups.
///
/// It is the only place where non deterministic inputs enter the chain: the batch timestamp, the
/// batch randomness and the reaction to L1 forks. Everything computed from a batch afterwards is
/// deterministic.
#[derive(Debug)]
pub struct Sequencer<DB, E, V> {
    components: EnclaveComponents<DB, E, V>,
    mempool: Mempool,
    signer: EnclaveSigner,
    producer: RollupProducer<DB>,
    /// Serializes the creation of new batches with fork replays.
    batch_production: Mutex<()>,
    metrics: SequencerMetrics,
}

impl<DB, E, V> Sequencer<DB, E, V>
where
    DB: DatabaseWriteOperations + Clone,
    E: TransactionExecutor,
    V: AttestationVerifier,
{
    /// Returns a new [`Sequencer`] signing with `signer`.
    ///
    /// The address of the signer is registered as the attested key of the sequencer, the
    /// sequencer validates the rollups it later finds on L1 against it.
    pub fn new(
        components: EnclaveComponents<DB, E, V>,
        signer: EnclaveSigner,
    ) -> Result<Self, NodeError> {
        let config = components.config;
        components.db.store_attested_key(config.sequencer_id, signer.address())?;
        let producer =
            RollupProducer::new(components.db.clone(), components.registry.clone(), signer.clone());

        Ok(Self {
            mempool: Mempool::new(config.chain.chain_id),
            components,
            signer,
            producer,
            batch_production: Mutex::new(()),
            metrics: SequencerMetrics::default(),
        })
    }

    /// Returns the shared components.
    pub const fn components(&self) -> &EnclaveComponents<DB, E, V> {
        &self.components
    }

    /// Returns the mempool.
    pub const fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    /// Creates the genesis batch if none exists, the next head batch otherwise.
    ///
    /// If the L1 head moved to another branch since the head batch was created, the batches
    /// anchored to the abandoned branch are replayed on the new one first.
    pub fn create_batch(&self, skip_if_empty: bool) -> Result<Option<Batch>, NodeError> {
        let _ingestion = self.components.lock_ingestion();
        let _production = self.batch_production.lock();
        let start = Instant::now();

        let l1_head = self.components.db.fetch_head_block()?;
        let batch = if self.components.registry.head_batch_seq().is_none() {
            Some(self.init_genesis(&l1_head)?)
        } else {
            self.create_new_head_batch(&l1_head, skip_if_empty)?
        };

        if batch.is_some() {
            self.metrics.created_batches.increment(1);
            self.metrics.batch_creation_duration.record(start.elapsed().as_secs_f64());
        }
        Ok(batch)
    }

    /// Creates a signed rollup of the batches anchored up to the L1 head.
    pub fn create_rollup(&self, from_seq: Option<u64>) -> Result<Rollup, NodeError> {
        let _ingestion = self.components.lock_ingestion();
        let from_seq = match from_seq {
            Some(seq_no) => seq_no,
            None => self.next_rollup_seq_no()?,
        };
        let upto_l1_height = self.components.db.fetch_head_block()?.number();

        let mut limiter = RollupSizeLimiter::new(self.components.config.max_rollup_size);
        let rollup = self.producer.create_rollup(from_seq, upto_l1_height, &mut limiter)?;
        self.metrics.created_rollups.increment(1);
        Ok(rollup)
    }

    fn init_genesis(&self, l1_head: &L1Block) -> Result<Batch, NodeError> {
        let (batch, deploy_tx) =
            self.components.executor.create_genesis_state(l1_head.hash(), unix_now())?;
        let batch = self.signer.sign_batch(batch)?;
        self.components.db.store_batch(&batch, &[])?;
        self.set_head(&batch, &[])?;
        self.mempool.add_tx(deploy_tx)?;

        tracing::info!(target: "enclave::sequencer", hash = ?batch.hash(), l1_proof = ?l1_head.hash(), "Created genesis batch");
        Ok(batch)
    }

    fn create_new_head_batch(
        &self,
        l1_head: &L1Block,
        skip_if_empty: bool,
    ) -> Result<Option<Batch>, NodeError> {
        let mut head = self.components.db.fetch_head_batch()?;

        // A head anchored to the canonical chain is its own ancestral batch. A different height
        // means the head was built on an abandoned branch.
        let ancestral = self.components.registry.find_ancestral_batch_for(l1_head)?;
        if ancestral.number() != head.number() {
            self.handle_fork(l1_head, &ancestral, &head)?;
            head = self.components.db.fetch_head_batch()?;
        } else if ancestral.hash() != head.hash() {
            // The L1 head returned to a branch whose batches were replayed elsewhere. The
            // ancestral batch sits at the head height and is the one on the canonical chain.
            tracing::info!(target: "enclave::sequencer", head = ?head.hash(), ancestral = ?ancestral.hash(), "Resuming from the ancestral batch of the L1 head");
            head = ancestral;
        }

        let mut limiter = BatchSizeLimiter::new(self.components.config.max_batch_size);
        let transactions = self.mempool.current_txs(&head, &self.components.db, &mut limiter)?;
        if transactions.is_empty() && skip_if_empty {
            tracing::trace!(target: "enclave::sequencer", "No pending transactions, skipping batch");
            return Ok(None);
        }

        let context = BatchExecutionContext {
            block_hash: l1_head.hash(),
            parent_hash: head.hash(),
            transactions,
            at_time: unix_now().max(head.header.time),
            randomness: B256::from(rand::random::<[u8; 32]>()),
            creator: self.signer.address(),
            seq_no: self.next_seq_no(),
        };
        let (batch, receipts) = self.compute_and_store(&context)?;
        self.set_head(&batch, &receipts)?;
        self.mempool.remove_txs(&batch, &self.components.db)?;

        tracing::info!(
            target: "enclave::sequencer",
            hash = ?batch.hash(),
            number = batch.number(),
            seq_no = batch.seq_no(),
            txs = batch.transactions.len(),
            "Created new head batch"
        );
        Ok(Some(batch))
    }

    /// Replays the batches above `ancestral` on top of it, anchored to `l1_head`.
    ///
    /// Each replay keeps the transactions, timestamp and randomness of the batch it replaces and
    /// takes the next sequence number. The newest replay becomes the head.
    fn handle_fork(&self, l1_head: &L1Block, ancestral: &Batch, head: &Batch) -> Result<(), NodeError> {
        if ancestral.number() > head.number() {
            tracing::error!(target: "enclave::sequencer", ancestral = ?ancestral.hash(), head = ?head.hash(), "Fork resolved to a batch above the head");
            return Err(NodeError::AncestralAboveHead {
                hash: ancestral.hash(),
                ancestral: ancestral.number(),
                head: head.number(),
            });
        }

        let mut orphans = Vec::new();
        let mut current = head.clone();
        while current.number() > ancestral.number() {
            let parent = self.components.db.fetch_batch(current.parent_hash())?;
            orphans.push(current);
            current = parent;
        }
        tracing::info!(
            target: "enclave::sequencer",
            ancestral = ?ancestral.hash(),
            l1_head = ?l1_head.hash(),
            orphans = orphans.len(),
            "Replaying batches on the new L1 branch"
        );

        let mut seq_no = self.next_seq_no();
        let mut parent_hash = ancestral.hash();
        let mut replayed = Vec::with_capacity(orphans.len());
        for orphan in orphans.iter().rev() {
            let context = BatchExecutionContext {
                block_hash: l1_head.hash(),
                parent_hash,
                transactions: orphan.transactions.clone(),
                at_time: orphan.header.time,
                randomness: orphan.header.mix_digest,
                creator: self.signer.address(),
                seq_no,
            };
            let (batch, receipts) = self.compute_and_store(&context).inspect_err(|err| {
                tracing::error!(target: "enclave::sequencer", orphan = ?orphan.hash(), %err, "Failed to replay batch");
            })?;
            parent_hash = batch.hash();
            seq_no += 1;
            replayed.push((batch, receipts));
        }

        if let Some((head, _)) = replayed.last() {
            self.components.db.update_head_batch(head.hash())?;
        }
        for (batch, receipts) in &replayed {
            self.components.registry.on_batch_executed(batch, receipts);
        }
        self.metrics.replayed_batches.increment(replayed.len() as u64);
        Ok(())
    }

    /// Computes, commits, signs and stores the batch described by `context`.
    fn compute_and_store(
        &self,
        context: &BatchExecutionContext,
    ) -> Result<(Batch, Receipts), NodeError> {
        let computed = self.components.executor.compute_batch(context)?;
        self.components.executor.commit(&computed)?;
        let batch = self.signer.sign_batch(computed.batch)?;
        self.components.db.store_batch(&batch, &computed.receipts)?;
        Ok((batch, computed.receipts))
    }

    fn set_head(&self, batch: &Batch, receipts: &[Receipt]) -> Result<(), NodeError> {
        self.components.db.update_head_batch(batch.hash())?;
        self.components.registry.on_batch_executed(batch, receipts);
        Ok(())
    }

    fn next_seq_no(&self) -> u64 {
        self.components.registry.head_batch_seq().map_or(L2_GENESIS_SEQ_NO, |seq_no| seq_no + 1)
    }

    /// Returns the sequence number following the latest stored rollup.
    fn next_rollup_seq_no(&self) -> Result<u64, NodeError> {
        match self.components.db.fetch_latest_rollup() {
            Ok(rollup) => Ok(rollup.header.last_batch_seq_no + 1),
            Err(err) if err.is_not_found() => Ok(L2_GENESIS_SEQ_NO),
            Err(err) => Err(err.into()),
        }
    }
}

impl<DB, E, V> EnclaveNode for Sequencer<DB, E, V>
where
    DB: DatabaseWriteOperations + Clone + Send + Sync + 'static,
    E: TransactionExecutor + 'static,
    V: AttestationVerifier + 'static,
{
    fn node_type(&self) -> NodeType {
        NodeType::Sequencer
    }

    fn submit_l1_block(
        &self,
        block: &BlockAndReceipts,
        is_latest: bool,
    ) -> Result<BlockSubmissionResponse, NodeError> {
        self.components.ingest_block(block, is_latest)
    }

    fn submit_tx(&self, tx: L2Transaction) -> Result<B256, NodeError> {
        let hash = tx.hash();
        self.mempool.add_tx(tx)?;
        Ok(hash)
    }

    fn submit_batch(&self, _batch: &Batch) -> Result<(), NodeError> {
        Err(NodeError::Unsupported { operation: "submit_batch", node_type: NodeType::Sequencer })
    }

    fn create_batch(&self, skip_if_empty: bool) -> Result<Option<Batch>, NodeError> {
        Self::create_batch(self, skip_if_empty)
    }

    fn create_rollup(&self, from_seq: Option<u64>) -> Result<Rollup, NodeError> {
        Self::create_rollup(self, from_seq)
    }

    fn head_batch(&self) -> Result<Option<Batch>, NodeError> {
        self.components.head_batch()
    }

    fn status(&self) -> Result<EnclaveStatus, NodeError> {
        self.components.status(NodeType::Sequencer)
    }
}

/// Returns the current unix time in seconds.
fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|elapsed| elapsed.as_secs()).unwrap_or_default()
}
