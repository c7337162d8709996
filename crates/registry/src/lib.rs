//! The registry of executed batches.
//!
//! The [`BatchRegistry`] tracks the sequence number of the head batch, serves the runs of
//! batches rollups are built from and answers point in time state queries.

use enclave_db::{DatabaseReadOperations, StateDb};
use enclave_primitives::{
    constants::{L1_GENESIS_HEIGHT, L2_GENESIS_HEIGHT},
    Batch, L1Block, Receipt, Receipts, RollupLimiter,
};
use parking_lot::Mutex;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

mod error;
pub use error::RegistryError;

mod metrics;
pub use metrics::RegistryMetrics;

/// The age in seconds after which the head batch is considered stale.
pub const MAX_HEAD_BATCH_AGE: u64 = 60;

/// A batch selector for state and batch queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchNumber {
    /// The genesis batch.
    Earliest,
    /// The head batch.
    Latest,
    /// The canonical batch at the provided height.
    Number(u64),
}

/// A notification sent to subscribers for each executed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedBatch {
    /// The executed batch.
    pub batch: Batch,
    /// The receipts of the batch.
    pub receipts: Receipts,
}

/// The [`BatchRegistry`].
#[derive(Debug)]
pub struct BatchRegistry<DB> {
    db: DB,
    /// The sequence number of the head batch, if any batch was executed.
    head_batch_seq: Mutex<Option<u64>>,
    /// The subscribers to executed batches.
    subscribers: Mutex<Vec<UnboundedSender<ExecutedBatch>>>,
    metrics: RegistryMetrics,
}

impl<DB: DatabaseReadOperations> BatchRegistry<DB> {
    /// Returns a new [`BatchRegistry`], resuming from the head batch in storage.
    pub fn new(db: DB) -> Result<Self, RegistryError> {
        let head_batch_seq = match db.fetch_head_batch() {
            Ok(batch) => Some(batch.seq_no()),
            Err(err) if err.is_not_found() => None,
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            db,
            head_batch_seq: Mutex::new(head_batch_seq),
            subscribers: Mutex::new(Vec::new()),
            metrics: RegistryMetrics::default(),
        })
    }

    /// Returns the sequence number of the head batch.
    pub fn head_batch_seq(&self) -> Option<u64> {
        *self.head_batch_seq.lock()
    }

    /// Returns a channel receiving every executed batch.
    pub fn subscribe(&self) -> UnboundedReceiver<ExecutedBatch> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Records the execution of a stored batch. The head moves to the batch and the subscribers
    /// are notified.
    pub fn on_batch_executed(&self, batch: &Batch, receipts: &[Receipt]) {
        *self.head_batch_seq.lock() = Some(batch.seq_no());
        self.metrics.head_batch_seq_no.set(batch.seq_no() as f64);
        self.metrics.executed_batches.increment(1);
        tracing::trace!(target: "enclave::registry", hash = ?batch.hash(), seq_no = batch.seq_no(), "Batch executed");

        let notification = ExecutedBatch { batch: batch.clone(), receipts: receipts.to_vec() };
        self.subscribers.lock().retain(|subscriber| subscriber.send(notification.clone()).is_ok());
    }

    /// Returns the batches with a sequence number from `from_seq` upwards, as long as their
    /// anchor block is not above `upto_l1_height` and `limiter` accepts them, together with the
    /// distinct anchor blocks in order.
    pub fn batches_after(
        &self,
        from_seq: u64,
        upto_l1_height: u64,
        limiter: &mut dyn RollupLimiter,
    ) -> Result<(Vec<Batch>, Vec<L1Block>), RegistryError> {
        let Some(head_seq) = self.head_batch_seq() else {
            return Ok((Vec::new(), Vec::new()));
        };

        let mut batches: Vec<Batch> = Vec::new();
        let mut blocks: Vec<L1Block> = Vec::new();
        for seq_no in from_seq..=head_seq {
            let batch = self.db.fetch_batch_by_seq_no(seq_no)?;
            let block = match blocks.last() {
                Some(block) if block.hash() == batch.l1_proof() => None,
                _ => Some(self.db.fetch_block(batch.l1_proof())?),
            };
            let number = block.as_ref().or(blocks.last()).map(L1Block::number).unwrap_or_default();
            if number > upto_l1_height || !limiter.accept_batch(&batch) {
                break;
            }
            blocks.extend(block);
            batches.push(batch);
        }

        for (expected, batch) in (from_seq..).zip(&batches) {
            if batch.seq_no() != expected {
                tracing::error!(target: "enclave::registry", expected, got = batch.seq_no(), "Non consecutive batches");
                return Err(RegistryError::NonConsecutiveBatches { expected, got: batch.seq_no() });
            }
        }
        Ok((batches, blocks))
    }

    /// Returns the latest batch anchored to `block` or to its closest ancestor that anchors a
    /// batch. The walk is bounded by L1 genesis.
    pub fn find_ancestral_batch_for(&self, block: &L1Block) -> Result<Batch, RegistryError> {
        let mut current = block.clone();
        loop {
            match self.db.fetch_head_batch_for_block(current.hash()) {
                Ok(batch) => return Ok(batch),
                Err(err) if err.is_not_found() && current.number() > L1_GENESIS_HEIGHT => {
                    current = self.db.fetch_block(current.parent_hash())?;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Returns the batch selected by `number`.
    pub fn get_batch_at_height(&self, number: BatchNumber) -> Result<Batch, RegistryError> {
        let batch = match number {
            BatchNumber::Earliest => self.db.fetch_batch_by_height(L2_GENESIS_HEIGHT)?,
            BatchNumber::Latest => self.db.fetch_head_batch()?,
            BatchNumber::Number(number) => self.db.fetch_batch_by_height(number)?,
        };
        Ok(batch)
    }

    /// Returns the post-state of the batch selected by `number`.
    pub fn state_at_height(&self, number: BatchNumber) -> Result<StateDb, RegistryError> {
        let batch = self.get_batch_at_height(number)?;
        Ok(self.db.create_state_db(batch.header.root)?)
    }

    /// Checks that a head batch exists and is at most [`MAX_HEAD_BATCH_AGE`] seconds older than
    /// `now`.
    pub fn health_check(&self, now: u64) -> Result<(), RegistryError> {
        if self.head_batch_seq().is_none() {
            return Err(RegistryError::NoHeadBatch);
        }
        let head = self.db.fetch_head_batch()?;
        let age = now.saturating_sub(head.header.time);
        if age > MAX_HEAD_BATCH_AGE {
            return Err(RegistryError::StaleHeadBatch { seq_no: head.seq_no(), age });
        }
        Ok(())
    }
}
