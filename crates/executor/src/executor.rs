use crate::{
    BatchExecutionContext, CrossChainProcessor, ExecutorError, ExecutorMetrics, Genesis,
    TransactionExecutor,
};

use alloy_consensus::EMPTY_ROOT_HASH;
use alloy_primitives::B256;
use enclave_db::{DatabaseError, DatabaseWriteOperations, StateDb};
use enclave_primitives::{
    constants::{L2_GENESIS_HEIGHT, L2_GENESIS_SEQ_NO},
    receipts_root, transactions_root, Batch, BatchHeader, ChainConfig, L1Block, L2Transaction,
    Receipts,
};
use parking_lot::Mutex;
use std::time::Instant;

/// A freshly computed batch together with its receipts and post-state.
///
/// Nothing is persisted until the batch is passed to [`BatchExecutor::commit`], so a computed
/// batch that turns out to be invalid can simply be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedBatch {
    /// The computed batch, unsigned.
    pub batch: Batch,
    /// The receipts of the synthetic and ordinary transactions, in execution order.
    pub receipts: Receipts,
    /// The post-state of the batch.
    pub state: StateDb,
}

/// The [`BatchExecutor`] computes, validates and commits L2 batches.
#[derive(Debug)]
pub struct BatchExecutor<DB, E> {
    /// The storage.
    db: DB,
    /// The execution sandbox.
    sandbox: E,
    /// The cross chain message processor.
    cross_chain: CrossChainProcessor,
    /// The chain configuration.
    chain_config: ChainConfig,
    /// The genesis allocation.
    genesis: Genesis,
    /// Serializes commits: computations run concurrently, commits do not.
    commit_lock: Mutex<()>,
    /// The executor metrics.
    metrics: ExecutorMetrics,
}

impl<DB, E> BatchExecutor<DB, E>
where
    DB: DatabaseWriteOperations,
    E: TransactionExecutor,
{
    /// Returns a new [`BatchExecutor`].
    pub fn new(
        db: DB,
        sandbox: E,
        chain_config: ChainConfig,
        genesis: Genesis,
    ) -> Result<Self, ExecutorError> {
        Ok(Self {
            db,
            sandbox,
            cross_chain: CrossChainProcessor::new(chain_config)?,
            chain_config,
            genesis,
            commit_lock: Mutex::new(()),
            metrics: ExecutorMetrics::default(),
        })
    }

    /// Returns the cross chain message processor.
    pub const fn cross_chain(&self) -> &CrossChainProcessor {
        &self.cross_chain
    }

    /// Returns the chain configuration.
    pub const fn chain_config(&self) -> &ChainConfig {
        &self.chain_config
    }

    /// Computes the batch described by `context` on top of its parent batch.
    ///
    /// The computation only reads from storage. Synthetic transactions delivering the inbound
    /// messages of the L1 blocks between the parent anchor and the new anchor run first, then the
    /// ordinary transactions in the provided order. Ordinary transactions the sandbox cannot
    /// execute are left out of the batch.
    pub fn compute_batch(
        &self,
        context: &BatchExecutionContext,
    ) -> Result<ComputedBatch, ExecutorError> {
        let now = Instant::now();

        let block = self.fetch_block(context.block_hash)?;
        let parent = self.db.fetch_batch(context.parent_hash).map_err(|err| {
            if err.is_not_found() {
                ExecutorError::AncestorBatchNotFound(context.parent_hash)
            } else {
                err.into()
            }
        })?;
        let parent_block = self.fetch_block(parent.l1_proof())?;

        let mut header = self.empty_batch_header(&parent, &block, context);
        let mut state = self.db.create_state_db(parent.header.root)?;

        // The message bus is deployed by the first batch after genesis.
        let synthetic = if context.seq_no > L2_GENESIS_SEQ_NO + 1 {
            let messages =
                self.cross_chain.retrieve_inbound_messages(&self.db, &parent_block, &block)?;
            header.latest_inbound_cross_chain_hash = block.hash();
            header.latest_inbound_cross_chain_height = block.number();
            self.cross_chain.create_synthetic_transactions(&messages, &state)?
        } else {
            Vec::new()
        };

        let mut receipts = Vec::with_capacity(synthetic.len() + context.transactions.len());
        let mut results = self.sandbox.execute_transactions(
            &synthetic,
            &mut state,
            &header,
            &self.chain_config,
            0,
        );
        for tx in &synthetic {
            let hash = tx.hash();
            match results.remove(&hash) {
                Some(Ok(receipt)) if receipt.success => receipts.push(receipt),
                outcome => {
                    tracing::error!(target: "enclave::executor", ?hash, ?outcome, "Synthetic transaction failed");
                    return Err(ExecutorError::SyntheticTransactionFailed(hash));
                }
            }
        }

        let mut results = self.sandbox.execute_transactions(
            &context.transactions,
            &mut state,
            &header,
            &self.chain_config,
            synthetic.len(),
        );
        let mut included = Vec::with_capacity(context.transactions.len());
        for tx in &context.transactions {
            let hash = tx.hash();
            match results.remove(&hash) {
                Some(Ok(receipt)) => {
                    receipts.push(receipt);
                    included.push(tx.clone());
                }
                outcome => {
                    tracing::debug!(target: "enclave::executor", ?hash, ?outcome, "Excluding transaction from batch");
                    self.metrics.excluded_transactions.increment(1);
                }
            }
        }

        header.cross_chain_messages = self.cross_chain.extract_outbound_messages(&receipts);
        header.gas_used = receipts.iter().map(|receipt| receipt.gas_used).sum();
        header.root = state.root();
        header.tx_hash = transactions_root(&included);
        header.receipt_hash = receipts_root(&receipts);

        let batch = Batch { header, signature: None, transactions: included };
        tracing::trace!(
            target: "enclave::executor",
            hash = ?batch.hash(),
            seq_no = batch.seq_no(),
            number = batch.number(),
            txs = batch.transactions.len(),
            "Computed batch"
        );
        self.metrics.batch_computation_duration.record(now.elapsed().as_secs_f64());

        Ok(ComputedBatch { batch, receipts, state })
    }

    /// Validates an externally produced batch by recomputing it from its declared context and
    /// commits its state if the recomputed hash matches.
    ///
    /// The root and commitments declared by `batch` are never trusted: any difference between the
    /// provided and the recomputed batch surfaces as [`ExecutorError::InvalidBatch`].
    pub fn execute_batch(&self, batch: &Batch) -> Result<Receipts, ExecutorError> {
        let computed = if batch.is_genesis() {
            self.compute_genesis(batch.l1_proof(), batch.header.time)?.0
        } else {
            self.compute_batch(&BatchExecutionContext::from(batch))?
        };

        let (expected, computed_hash) = (batch.hash(), computed.batch.hash());
        if expected != computed_hash {
            tracing::warn!(target: "enclave::executor", ?expected, computed = ?computed_hash, "Batch is in invalid state");
            self.metrics.rejected_batches.increment(1);
            return Err(ExecutorError::InvalidBatch { expected, computed: computed_hash });
        }

        self.commit(&computed)?;
        Ok(computed.receipts)
    }

    /// Creates the genesis batch anchored to the L1 block `block_hash` and commits the genesis
    /// state. Also returns the transaction deploying the L2 message bus, which must be the first
    /// transaction of the chain.
    pub fn create_genesis_state(
        &self,
        block_hash: B256,
        time: u64,
    ) -> Result<(Batch, L2Transaction), ExecutorError> {
        let (computed, deploy_tx) = self.compute_genesis(block_hash, time)?;
        self.commit(&computed)?;
        Ok((computed.batch, deploy_tx))
    }

    /// Computes the genesis batch without persisting its state.
    fn compute_genesis(
        &self,
        block_hash: B256,
        time: u64,
    ) -> Result<(ComputedBatch, L2Transaction), ExecutorError> {
        let state = self.genesis.state();
        let header = BatchHeader {
            parent_hash: B256::ZERO,
            root: state.root(),
            tx_hash: EMPTY_ROOT_HASH,
            receipt_hash: EMPTY_ROOT_HASH,
            number: L2_GENESIS_HEIGHT,
            sequencer_order_no: L2_GENESIS_SEQ_NO,
            gas_limit: self.chain_config.gas_limit,
            time,
            base_fee: self.chain_config.base_fee,
            l1_proof: block_hash,
            ..Default::default()
        };
        let deploy_tx = self.cross_chain.message_bus_deploy_tx()?;

        let batch = Batch { header, signature: None, transactions: Vec::new() };
        Ok((ComputedBatch { batch, receipts: Vec::new(), state }, deploy_tx))
    }

    /// Persists the post-state of a computed batch and returns its root.
    pub fn commit(&self, computed: &ComputedBatch) -> Result<B256, ExecutorError> {
        let root = self.commit_state(&computed.state)?;
        if root != computed.batch.header.root {
            tracing::error!(target: "enclave::executor", expected = ?computed.batch.header.root, committed = ?root, "State root mismatch");
            return Err(ExecutorError::StateRootMismatch {
                expected: computed.batch.header.root,
                committed: root,
            });
        }
        self.metrics.committed_batches.increment(1);
        Ok(root)
    }

    fn commit_state(&self, state: &StateDb) -> Result<B256, ExecutorError> {
        let _guard = self.commit_lock.lock();
        Ok(self.db.commit_state(state)?)
    }

    fn fetch_block(&self, hash: B256) -> Result<L1Block, ExecutorError> {
        self.db.fetch_block(hash).map_err(|err| match err {
            DatabaseError::NotFound(_) => ExecutorError::BlockForBatchNotFound(hash),
            err => err.into(),
        })
    }

    /// Returns the header of a batch without transactions on top of `parent`. It only depends on
    /// its inputs.
    fn empty_batch_header(
        &self,
        parent: &Batch,
        block: &L1Block,
        context: &BatchExecutionContext,
    ) -> BatchHeader {
        BatchHeader {
            parent_hash: parent.hash(),
            root: parent.header.root,
            tx_hash: EMPTY_ROOT_HASH,
            receipt_hash: EMPTY_ROOT_HASH,
            number: parent.number() + 1,
            sequencer_order_no: context.seq_no,
            gas_limit: self.chain_config.gas_limit,
            gas_used: 0,
            time: context.at_time,
            base_fee: self.chain_config.base_fee,
            coinbase: context.creator,
            l1_proof: block.hash(),
            mix_digest: context.randomness,
            cross_chain_messages: Vec::new(),
            latest_inbound_cross_chain_hash: parent.header.latest_inbound_cross_chain_hash,
            latest_inbound_cross_chain_height: parent.header.latest_inbound_cross_chain_height,
        }
    }
}
