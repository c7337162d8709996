//! The pool of pending L2 transactions.
//!
//! Transactions stay in the [`Mempool`] until the batch including them is
//! [`HEIGHT_COMMITTED_BLOCKS`] batches below the head. Until then a fork may drop the batch and
//! the transaction must be available to be included again.

use alloy_primitives::{Address, B256};
use enclave_db::DatabaseReadOperations;
use enclave_primitives::{
    constants::{HEIGHT_COMMITTED_BLOCKS, L2_GENESIS_HEIGHT},
    Batch, BatchSizeLimiter, L2Transaction,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

mod error;
pub use error::MempoolError;

mod metrics;
pub use metrics::MempoolMetrics;

#[derive(Debug, Clone)]
struct PoolEntry {
    tx: L2Transaction,
    /// The arrival order of the transaction.
    arrival: u64,
}

#[derive(Debug, Default)]
struct PoolInner {
    entries: HashMap<B256, PoolEntry>,
    arrivals: u64,
}

/// The [`Mempool`].
#[derive(Debug)]
pub struct Mempool {
    chain_id: u64,
    inner: Mutex<PoolInner>,
    metrics: MempoolMetrics,
}

impl Mempool {
    /// Returns an empty [`Mempool`] accepting transactions for the provided chain.
    pub fn new(chain_id: u64) -> Self {
        Self { chain_id, inner: Mutex::new(PoolInner::default()), metrics: MempoolMetrics::default() }
    }

    /// Adds a transaction after checking its signature and chain id.
    pub fn add_tx(&self, tx: L2Transaction) -> Result<(), MempoolError> {
        let result = self.validate(&tx);
        let sender = match result {
            Ok(sender) => sender,
            Err(err) => {
                tracing::debug!(target: "enclave::mempool", hash = ?tx.hash(), %err, "Rejected transaction");
                self.metrics.rejected_transactions.increment(1);
                return Err(err);
            }
        };

        let hash = tx.hash();
        let mut inner = self.inner.lock();
        if inner.entries.contains_key(&hash) {
            return Err(MempoolError::AlreadyKnown(hash));
        }
        let arrival = inner.arrivals;
        inner.arrivals += 1;
        inner.entries.insert(hash, PoolEntry { tx, arrival });
        self.metrics.size.set(inner.entries.len() as f64);
        tracing::trace!(target: "enclave::mempool", ?hash, ?sender, "Added transaction");
        Ok(())
    }

    /// Returns the transactions to include in the batch following `head`.
    ///
    /// Transactions included in the last [`HEIGHT_COMMITTED_BLOCKS`] batches up to `head` are
    /// skipped. The rest is ordered by nonce, then arrival, and passed through `limiter`.
    pub fn current_txs<DB: DatabaseReadOperations>(
        &self,
        head: &Batch,
        db: &DB,
        limiter: &mut BatchSizeLimiter,
    ) -> Result<Vec<L2Transaction>, MempoolError> {
        let mut included = HashSet::new();
        let mut current = head.clone();
        for _ in 0..HEIGHT_COMMITTED_BLOCKS {
            included.extend(current.tx_hashes());
            if current.number() == L2_GENESIS_HEIGHT {
                break;
            }
            current = db.fetch_batch(current.parent_hash())?;
        }

        let mut pending: Vec<PoolEntry> = self
            .inner
            .lock()
            .entries
            .iter()
            .filter(|(hash, _)| !included.contains(*hash))
            .map(|(_, entry)| entry.clone())
            .collect();
        pending.sort_by_key(|entry| (entry.tx.nonce(), entry.arrival));

        Ok(pending
            .into_iter()
            .map(|entry| entry.tx)
            .filter(|tx| limiter.accept_transaction(tx))
            .collect())
    }

    /// Removes the transactions of the batch [`HEIGHT_COMMITTED_BLOCKS`] below `head`. That batch
    /// can no longer be dropped by a fork.
    pub fn remove_txs<DB: DatabaseReadOperations>(
        &self,
        head: &Batch,
        db: &DB,
    ) -> Result<(), MempoolError> {
        if head.number() < HEIGHT_COMMITTED_BLOCKS {
            return Ok(());
        }
        let mut committed = head.clone();
        for _ in 0..HEIGHT_COMMITTED_BLOCKS {
            committed = db.fetch_batch(committed.parent_hash())?;
        }

        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        for hash in committed.tx_hashes() {
            inner.entries.remove(&hash);
        }
        let removed = before - inner.entries.len();
        self.metrics.removed_transactions.increment(removed as u64);
        self.metrics.size.set(inner.entries.len() as f64);
        if removed > 0 {
            tracing::trace!(target: "enclave::mempool", batch = ?committed.hash(), removed, "Removed committed transactions");
        }
        Ok(())
    }

    /// Returns the pending transaction with the provided hash.
    pub fn fetch_tx(&self, hash: B256) -> Option<L2Transaction> {
        self.inner.lock().entries.get(&hash).map(|entry| entry.tx.clone())
    }

    /// Returns the number of pending transactions.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns true if no transaction is pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn validate(&self, tx: &L2Transaction) -> Result<Address, MempoolError> {
        if tx.chain_id() != self.chain_id {
            return Err(MempoolError::InvalidChainId { expected: self.chain_id, got: tx.chain_id() });
        }
        Ok(tx.recover_sender()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enclave_db::{Database, DatabaseWriteOperations};
    use alloy_primitives::U256;
    use enclave_primitives::{test_utils::TestWallet, BatchHeader};

    const CHAIN_ID: u64 = 443;

    /// Stores a chain of `len` batches and returns them. The transactions of `txs` are included
    /// in the batch at the same index.
    fn batch_chain(db: &Database, len: usize, mut txs: Vec<Vec<L2Transaction>>) -> Vec<Batch> {
        txs.resize(len, Vec::new());
        let mut batches: Vec<Batch> = Vec::new();
        for (i, transactions) in txs.into_iter().enumerate() {
            let header = BatchHeader {
                parent_hash: batches.last().map(Batch::hash).unwrap_or_default(),
                number: i as u64,
                sequencer_order_no: i as u64 + 1,
                ..Default::default()
            };
            let batch = Batch { header, signature: None, transactions };
            db.store_batch(&batch, &[]).unwrap();
            batches.push(batch);
        }
        batches
    }

    #[test]
    fn test_add_tx_validation() {
        let mempool = Mempool::new(CHAIN_ID);
        let mut wallet = TestWallet::random(CHAIN_ID);
        let tx = wallet.transfer(Address::repeat_byte(1), U256::from(1));

        mempool.add_tx(tx.clone()).unwrap();
        assert!(mempool.add_tx(tx.clone()).unwrap_err().is_duplicate());
        assert_eq!(mempool.fetch_tx(tx.hash()), Some(tx));

        let mut foreign = TestWallet::random(CHAIN_ID + 1);
        let err = mempool.add_tx(foreign.transfer(Address::repeat_byte(1), U256::from(1))).unwrap_err();
        assert!(matches!(err, MempoolError::InvalidChainId { .. }));
        assert_eq!(mempool.len(), 1);
    }

    #[test]
    fn test_current_txs_skips_recently_included() {
        let db = Database::new();
        let mempool = Mempool::new(CHAIN_ID);
        let mut wallet = TestWallet::random(CHAIN_ID);
        let txs: Vec<_> = (0..3).map(|_| wallet.transfer(Address::repeat_byte(1), U256::from(1))).collect();
        // Added in reverse order, selected by nonce.
        for tx in txs.iter().rev() {
            mempool.add_tx(tx.clone()).unwrap();
        }
        let batches = batch_chain(&db, 2, vec![vec![], vec![txs[0].clone()]]);

        let mut limiter = BatchSizeLimiter::new(usize::MAX);
        let selected = mempool.current_txs(&batches[1], &db, &mut limiter).unwrap();
        assert_eq!(selected, txs[1..].to_vec());

        let mut limiter = BatchSizeLimiter::new(txs[1].size());
        let selected = mempool.current_txs(&batches[1], &db, &mut limiter).unwrap();
        assert_eq!(selected, vec![txs[1].clone()]);
    }

    #[test]
    fn test_remove_txs_of_committed_batches() {
        let db = Database::new();
        let mempool = Mempool::new(CHAIN_ID);
        let mut wallet = TestWallet::random(CHAIN_ID);
        let first = wallet.transfer(Address::repeat_byte(1), U256::from(1));
        let second = wallet.transfer(Address::repeat_byte(1), U256::from(1));
        mempool.add_tx(first.clone()).unwrap();
        mempool.add_tx(second.clone()).unwrap();

        let len = HEIGHT_COMMITTED_BLOCKS as usize + 2;
        let batches = batch_chain(&db, len, vec![vec![], vec![first.clone()], vec![second.clone()]]);

        // The batch including the first transaction is not final yet.
        mempool.remove_txs(&batches[len - 2], &db).unwrap();
        assert_eq!(mempool.len(), 2);

        mempool.remove_txs(&batches[len - 1], &db).unwrap();
        assert_eq!(mempool.fetch_tx(first.hash()), None);
        assert_eq!(mempool.fetch_tx(second.hash()), Some(second));
    }
}
