//! Ingestion of L1 blocks.
//!
//! The [`L1BlockProcessor`] stores every L1 block it is fed, tracks the canonical chain through
//! forks and classifies each ingestion as pre-genesis, a normal extension or a fork. Blocks are
//! never deleted: a block abandoned by a fork only loses its canonical marker.

use alloy_primitives::B256;
use enclave_db::DatabaseWriteOperations;
use enclave_executor::CrossChainProcessor;
use enclave_l1::RespondSecretTx;
use enclave_primitives::{BlockAndReceipts, BlockInfo};

mod error;
pub use error::BlockProcessorError;

mod fork;
pub use fork::{find_common_ancestor, ChainFork};

mod metrics;
pub use metrics::BlockProcessorMetrics;

mod secret;
pub use secret::{AttestationError, AttestationVerifier, SharedSecretProcessor};

#[cfg(any(test, feature = "test-utils"))]
/// Common test helpers
pub mod test_utils;

/// The classification of an ingested L1 block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockIngestionType {
    /// The first block ever ingested, no L2 state exists yet.
    PreGenesis,
    /// The block extends the previous head.
    Normal,
    /// The block moves the head to another branch.
    Fork(ChainFork),
}

/// The outcome of ingesting an L1 block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockIngestion {
    /// The ingested block.
    pub block: BlockInfo,
    /// The classification of the ingestion.
    pub kind: BlockIngestionType,
    /// Whether the host reported the block as the latest L1 block.
    pub is_latest: bool,
    /// The responses to the network secret requests of the block.
    pub secret_responses: Vec<RespondSecretTx>,
}

impl BlockIngestion {
    /// Returns true if the first block ever was ingested.
    pub const fn is_pre_genesis(&self) -> bool {
        matches!(self.kind, BlockIngestionType::PreGenesis)
    }

    /// Returns the fork, if the block moved the head to another branch.
    pub const fn fork(&self) -> Option<&ChainFork> {
        match &self.kind {
            BlockIngestionType::Fork(fork) => Some(fork),
            _ => None,
        }
    }

    /// Returns the blocks that lost their canonical status.
    pub fn non_canonical_hashes(&self) -> &[B256] {
        self.fork().map(|fork| fork.non_canonical_path.as_slice()).unwrap_or_default()
    }
}

/// The [`L1BlockProcessor`] ingests L1 blocks.
#[derive(Debug)]
pub struct L1BlockProcessor<DB, V> {
    db: DB,
    cross_chain: CrossChainProcessor,
    secrets: SharedSecretProcessor<DB, V>,
    metrics: BlockProcessorMetrics,
}

impl<DB, V> L1BlockProcessor<DB, V>
where
    DB: DatabaseWriteOperations + Clone,
    V: AttestationVerifier,
{
    /// Returns a new [`L1BlockProcessor`].
    pub fn new(db: DB, cross_chain: CrossChainProcessor, secrets: SharedSecretProcessor<DB, V>) -> Self {
        Self { db, cross_chain, secrets, metrics: BlockProcessorMetrics::default() }
    }

    /// Ingests the block.
    ///
    /// The block is stored together with the canonical markers of the branch it belongs to before
    /// its cross chain and control messages are processed.
    pub fn process(
        &self,
        block: &BlockAndReceipts,
        is_latest: bool,
    ) -> Result<BlockIngestion, BlockProcessorError> {
        let l1_block = &block.block;
        let hash = l1_block.hash();
        match self.db.fetch_block(hash) {
            Ok(_) => return Err(BlockProcessorError::BlockAlreadyProcessed(hash)),
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err.into()),
        }

        let kind = match self.db.fetch_head_block() {
            Err(err) if err.is_not_found() => {
                self.db.store_block(l1_block, &[], &[])?;
                BlockIngestionType::PreGenesis
            }
            Err(err) => return Err(err.into()),
            Ok(head) if head.hash() == l1_block.parent_hash() => {
                self.db.store_block(l1_block, &[], &[])?;
                BlockIngestionType::Normal
            }
            Ok(head) => {
                let fork = find_common_ancestor(&self.db, l1_block, &head)?;
                self.db.store_block(l1_block, &fork.canonical_path, &fork.non_canonical_path)?;
                if fork.is_fork() {
                    tracing::info!(
                        target: "enclave::block_processor",
                        common_ancestor = ?fork.common_ancestor,
                        old_head = ?fork.old_canonical,
                        new_head = ?fork.new_canonical,
                        "Detected L1 fork"
                    );
                    self.metrics.forks.increment(1);
                    self.metrics.non_canonical_blocks.increment(fork.non_canonical_path.len() as u64);
                    BlockIngestionType::Fork(fork)
                } else {
                    BlockIngestionType::Normal
                }
            }
        };
        self.metrics.ingested_blocks.increment(1);
        self.metrics.head_block_number.set(l1_block.number() as f64);
        tracing::trace!(target: "enclave::block_processor", ?hash, number = l1_block.number(), ?kind, "Ingested L1 block");

        let messages = self.cross_chain.extract_l1_messages(block);
        if !messages.is_empty() {
            tracing::debug!(target: "enclave::block_processor", ?hash, count = messages.len(), "Storing inbound cross chain messages");
            self.db.store_l1_messages(hash, messages)?;
        }
        let secret_responses = self.secrets.process_network_secret_msgs(block)?;

        Ok(BlockIngestion { block: BlockInfo::from(l1_block), kind, is_latest, secret_responses })
    }
}
