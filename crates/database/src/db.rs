use crate::{
    metrics::DatabaseMetrics, DatabaseError, DatabaseReadOperations, DatabaseWriteOperations,
    NotFound, StateDb,
};

use alloy_primitives::{Address, B256};
use enclave_primitives::{
    constants::L2_GENESIS_HEIGHT, Batch, CrossChainMessages, L1Block, Receipt, Receipts, Rollup,
};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::{
    collections::{BTreeMap, HashMap},
    time::Instant,
};

/// The [`Database`] struct is the in-memory storage of the enclave.
///
/// Blocks, batches and rollups are content-addressed by hash, with auxiliary canonical indices by
/// height. All the state lives behind a single [`RwLock`], so every operation of
/// [`DatabaseWriteOperations`] is atomic.
#[derive(Debug, Default)]
pub struct Database {
    inner: RwLock<DatabaseInner>,
    metrics: DatabaseMetrics,
}

#[derive(Debug, Default)]
struct DatabaseInner {
    blocks: HashMap<B256, StoredBlock>,
    canonical_blocks: BTreeMap<u64, B256>,
    head_block: Option<B256>,
    batches: HashMap<B256, Batch>,
    batches_by_seq_no: BTreeMap<u64, B256>,
    batches_by_height: BTreeMap<u64, B256>,
    head_batch: Option<B256>,
    head_batch_for_block: HashMap<B256, B256>,
    receipts: HashMap<B256, Receipts>,
    states: HashMap<B256, StateDb>,
    l1_messages: HashMap<B256, CrossChainMessages>,
    rollups: HashMap<B256, Rollup>,
    latest_rollup: Option<B256>,
    attested_keys: HashMap<Address, Address>,
}

#[derive(Debug)]
struct StoredBlock {
    block: L1Block,
    canonical: bool,
}

impl Database {
    /// Returns an empty [`Database`].
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, DatabaseInner> {
        let now = Instant::now();
        let guard = self.inner.read();
        self.metrics.read_lock_acquire_duration.record(now.elapsed().as_secs_f64());
        guard
    }

    fn write(&self) -> RwLockWriteGuard<'_, DatabaseInner> {
        let now = Instant::now();
        let guard = self.inner.write();
        self.metrics.write_lock_acquire_duration.record(now.elapsed().as_secs_f64());
        guard
    }
}

impl DatabaseInner {
    fn batch(&self, hash: B256) -> Result<&Batch, DatabaseError> {
        self.batches.get(&hash).ok_or(DatabaseError::NotFound(NotFound::Batch(hash)))
    }

    fn set_canonical(&mut self, hash: B256) {
        if let Some(stored) = self.blocks.get_mut(&hash) {
            stored.canonical = true;
            self.canonical_blocks.insert(stored.block.number(), hash);
        }
    }

    fn unset_canonical(&mut self, hash: B256) {
        if let Some(stored) = self.blocks.get_mut(&hash) {
            stored.canonical = false;
            let number = stored.block.number();
            if self.canonical_blocks.get(&number) == Some(&hash) {
                self.canonical_blocks.remove(&number);
            }
        }
    }
}

impl DatabaseReadOperations for Database {
    fn fetch_block(&self, hash: B256) -> Result<L1Block, DatabaseError> {
        self.read()
            .blocks
            .get(&hash)
            .map(|stored| stored.block.clone())
            .ok_or(DatabaseError::NotFound(NotFound::Block(hash)))
    }

    fn fetch_head_block(&self) -> Result<L1Block, DatabaseError> {
        let inner = self.read();
        inner
            .head_block
            .and_then(|hash| inner.blocks.get(&hash))
            .map(|stored| stored.block.clone())
            .ok_or(DatabaseError::NotFound(NotFound::HeadBlock))
    }

    fn fetch_canonical_block_by_height(&self, number: u64) -> Result<L1Block, DatabaseError> {
        let inner = self.read();
        inner
            .canonical_blocks
            .get(&number)
            .and_then(|hash| inner.blocks.get(hash))
            .map(|stored| stored.block.clone())
            .ok_or(DatabaseError::NotFound(NotFound::CanonicalBlock(number)))
    }

    fn is_canonical(&self, hash: B256) -> Result<bool, DatabaseError> {
        self.read()
            .blocks
            .get(&hash)
            .map(|stored| stored.canonical)
            .ok_or(DatabaseError::NotFound(NotFound::Block(hash)))
    }

    fn fetch_batch(&self, hash: B256) -> Result<Batch, DatabaseError> {
        self.read().batch(hash).cloned()
    }

    fn fetch_batch_by_seq_no(&self, seq_no: u64) -> Result<Batch, DatabaseError> {
        let inner = self.read();
        inner
            .batches_by_seq_no
            .get(&seq_no)
            .and_then(|hash| inner.batches.get(hash))
            .cloned()
            .ok_or(DatabaseError::NotFound(NotFound::BatchBySeqNo(seq_no)))
    }

    fn fetch_batch_by_height(&self, number: u64) -> Result<Batch, DatabaseError> {
        let inner = self.read();
        inner
            .batches_by_height
            .get(&number)
            .and_then(|hash| inner.batches.get(hash))
            .cloned()
            .ok_or(DatabaseError::NotFound(NotFound::BatchByHeight(number)))
    }

    fn fetch_head_batch(&self) -> Result<Batch, DatabaseError> {
        let inner = self.read();
        inner
            .head_batch
            .and_then(|hash| inner.batches.get(&hash))
            .cloned()
            .ok_or(DatabaseError::NotFound(NotFound::HeadBatch))
    }

    fn fetch_head_batch_for_block(&self, block_hash: B256) -> Result<Batch, DatabaseError> {
        let inner = self.read();
        inner
            .head_batch_for_block
            .get(&block_hash)
            .and_then(|hash| inner.batches.get(hash))
            .cloned()
            .ok_or(DatabaseError::NotFound(NotFound::HeadBatchForBlock(block_hash)))
    }

    fn fetch_batch_receipts(&self, hash: B256) -> Result<Receipts, DatabaseError> {
        self.read()
            .receipts
            .get(&hash)
            .cloned()
            .ok_or(DatabaseError::NotFound(NotFound::Receipts(hash)))
    }

    fn create_state_db(&self, root: B256) -> Result<StateDb, DatabaseError> {
        self.read().states.get(&root).cloned().ok_or(DatabaseError::NotFound(NotFound::State(root)))
    }

    fn fetch_l1_messages(&self, block_hash: B256) -> Result<CrossChainMessages, DatabaseError> {
        Ok(self.read().l1_messages.get(&block_hash).cloned().unwrap_or_default())
    }

    fn fetch_rollup(&self, hash: B256) -> Result<Rollup, DatabaseError> {
        self.read().rollups.get(&hash).cloned().ok_or(DatabaseError::NotFound(NotFound::Rollup(hash)))
    }

    fn fetch_latest_rollup(&self) -> Result<Rollup, DatabaseError> {
        let inner = self.read();
        inner
            .latest_rollup
            .and_then(|hash| inner.rollups.get(&hash))
            .cloned()
            .ok_or(DatabaseError::NotFound(NotFound::LatestRollup))
    }

    fn fetch_attested_key(&self, enclave_id: Address) -> Result<Address, DatabaseError> {
        self.read()
            .attested_keys
            .get(&enclave_id)
            .copied()
            .ok_or(DatabaseError::NotFound(NotFound::AttestedKey(enclave_id)))
    }
}

impl DatabaseWriteOperations for Database {
    fn store_block(
        &self,
        block: &L1Block,
        canonical: &[B256],
        non_canonical: &[B256],
    ) -> Result<(), DatabaseError> {
        let hash = block.hash();
        tracing::trace!(target: "enclave::db", ?hash, number = block.number(), "Storing block.");

        let mut inner = self.write();
        inner.blocks.insert(hash, StoredBlock { block: block.clone(), canonical: false });
        for hash in non_canonical {
            inner.unset_canonical(*hash);
        }
        for hash in canonical {
            inner.set_canonical(*hash);
        }
        inner.set_canonical(hash);
        inner.head_block = Some(hash);
        Ok(())
    }

    fn store_batch(&self, batch: &Batch, receipts: &[Receipt]) -> Result<(), DatabaseError> {
        let hash = batch.hash();
        tracing::trace!(target: "enclave::db", ?hash, seq_no = batch.seq_no(), number = batch.number(), "Storing batch.");

        let mut inner = self.write();
        if let Some(existing) = inner.batches_by_seq_no.get(&batch.seq_no()) {
            if *existing != hash {
                return Err(DatabaseError::Inconsistent(format!(
                    "sequence number {} already assigned to batch {existing}",
                    batch.seq_no()
                )));
            }
        }
        inner.batches_by_seq_no.insert(batch.seq_no(), hash);
        inner.receipts.insert(hash, receipts.to_vec());
        inner.batches.insert(hash, batch.clone());
        Ok(())
    }

    fn update_head_batch(&self, hash: B256) -> Result<(), DatabaseError> {
        let mut inner = self.write();
        let head = inner.batch(hash)?.clone();
        tracing::trace!(target: "enclave::db", ?hash, number = head.number(), "Updating head batch.");

        // Heights above the new head belong to an abandoned branch.
        inner.batches_by_height.retain(|number, _| *number <= head.number());
        inner.head_batch_for_block.insert(head.l1_proof(), hash);

        let mut current = head;
        loop {
            let (number, current_hash) = (current.number(), current.hash());
            if inner.batches_by_height.get(&number) == Some(&current_hash) {
                break;
            }
            inner.batches_by_height.insert(number, current_hash);
            inner.head_batch_for_block.entry(current.l1_proof()).or_insert(current_hash);
            if number == L2_GENESIS_HEIGHT {
                break;
            }
            current = inner.batch(current.parent_hash())?.clone();
        }

        inner.head_batch = Some(hash);
        Ok(())
    }

    fn commit_state(&self, state: &StateDb) -> Result<B256, DatabaseError> {
        let root = state.root();
        self.write().states.entry(root).or_insert_with(|| state.clone());
        Ok(root)
    }

    fn store_l1_messages(
        &self,
        block_hash: B256,
        messages: CrossChainMessages,
    ) -> Result<(), DatabaseError> {
        self.write().l1_messages.insert(block_hash, messages);
        Ok(())
    }

    fn store_rollup(&self, rollup: &Rollup) -> Result<(), DatabaseError> {
        let hash = rollup.hash();
        tracing::trace!(target: "enclave::db", ?hash, last_seq_no = rollup.header.last_batch_seq_no, "Storing rollup.");

        let mut inner = self.write();
        let is_latest = inner
            .latest_rollup
            .and_then(|latest| inner.rollups.get(&latest))
            .is_none_or(|latest| latest.header.last_batch_seq_no < rollup.header.last_batch_seq_no);
        inner.rollups.insert(hash, rollup.clone());
        if is_latest {
            inner.latest_rollup = Some(hash);
        }
        Ok(())
    }

    fn store_attested_key(&self, enclave_id: Address, key: Address) -> Result<(), DatabaseError> {
        tracing::trace!(target: "enclave::db", ?enclave_id, ?key, "Storing attested key.");
        self.write().attested_keys.insert(enclave_id, key);
        Ok(())
    }
}
