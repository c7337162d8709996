use crate::{DatabaseError, StateDb};
use alloy_primitives::{Address, B256};
use enclave_primitives::{Batch, CrossChainMessages, L1Block, Receipt, Receipts, Rollup};

/// Read access to the enclave storage.
///
/// Every lookup of a missing entry fails with [`DatabaseError::NotFound`].
#[auto_impl::auto_impl(&, Arc)]
pub trait DatabaseReadOperations: Send + Sync {
    /// Returns the L1 block with the provided hash.
    fn fetch_block(&self, hash: B256) -> Result<L1Block, DatabaseError>;

    /// Returns the current L1 head block.
    fn fetch_head_block(&self) -> Result<L1Block, DatabaseError>;

    /// Returns the canonical L1 block at the provided height.
    fn fetch_canonical_block_by_height(&self, number: u64) -> Result<L1Block, DatabaseError>;

    /// Returns true if the stored L1 block with the provided hash is on the canonical chain.
    fn is_canonical(&self, hash: B256) -> Result<bool, DatabaseError>;

    /// Returns the batch with the provided hash.
    fn fetch_batch(&self, hash: B256) -> Result<Batch, DatabaseError>;

    /// Returns the batch with the provided sequencer order number.
    fn fetch_batch_by_seq_no(&self, seq_no: u64) -> Result<Batch, DatabaseError>;

    /// Returns the canonical batch at the provided height.
    fn fetch_batch_by_height(&self, number: u64) -> Result<Batch, DatabaseError>;

    /// Returns the head batch.
    fn fetch_head_batch(&self) -> Result<Batch, DatabaseError>;

    /// Returns the latest batch anchored to the L1 block with the provided hash.
    fn fetch_head_batch_for_block(&self, block_hash: B256) -> Result<Batch, DatabaseError>;

    /// Returns the receipts of the batch with the provided hash.
    fn fetch_batch_receipts(&self, hash: B256) -> Result<Receipts, DatabaseError>;

    /// Returns a fresh state view rooted at `root`.
    fn create_state_db(&self, root: B256) -> Result<StateDb, DatabaseError>;

    /// Returns the cross chain messages published to L2 in the L1 block with the provided hash.
    /// Blocks without messages yield an empty list.
    fn fetch_l1_messages(&self, block_hash: B256) -> Result<CrossChainMessages, DatabaseError>;

    /// Returns the rollup with the provided hash.
    fn fetch_rollup(&self, hash: B256) -> Result<Rollup, DatabaseError>;

    /// Returns the rollup covering the highest sequencer order numbers.
    fn fetch_latest_rollup(&self) -> Result<Rollup, DatabaseError>;

    /// Returns the signing address attested for the enclave with the provided id.
    fn fetch_attested_key(&self, enclave_id: Address) -> Result<Address, DatabaseError>;
}

/// Write access to the enclave storage. Nothing is ever deleted.
#[auto_impl::auto_impl(&, Arc)]
pub trait DatabaseWriteOperations: DatabaseReadOperations {
    /// Stores `block` as the new canonical L1 head. The blocks of `canonical` are marked
    /// canonical at their height, the blocks of `non_canonical` lose the canonical marker.
    fn store_block(
        &self,
        block: &L1Block,
        canonical: &[B256],
        non_canonical: &[B256],
    ) -> Result<(), DatabaseError>;

    /// Stores a batch and its receipts, indexed by hash and sequencer order number.
    fn store_batch(&self, batch: &Batch, receipts: &[Receipt]) -> Result<(), DatabaseError>;

    /// Makes the stored batch with the provided hash the head batch. The height index is
    /// rewritten along its ancestors and the batch becomes the head batch of its L1 block.
    fn update_head_batch(&self, hash: B256) -> Result<(), DatabaseError>;

    /// Persists a state snapshot and returns its root.
    fn commit_state(&self, state: &StateDb) -> Result<B256, DatabaseError>;

    /// Stores the cross chain messages published to L2 in the L1 block with the provided hash.
    fn store_l1_messages(
        &self,
        block_hash: B256,
        messages: CrossChainMessages,
    ) -> Result<(), DatabaseError>;

    /// Stores a rollup.
    fn store_rollup(&self, rollup: &Rollup) -> Result<(), DatabaseError>;

    /// Stores the signing address attested for the enclave with the provided id.
    fn store_attested_key(&self, enclave_id: Address, key: Address) -> Result<(), DatabaseError>;
}
