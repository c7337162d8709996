use crate::{BlockSubmissionResponse, EnclaveConfig, EnclaveStatus, NodeError, NodeType};

use enclave_block_processor::{AttestationVerifier, L1BlockProcessor, SharedSecretProcessor};
use enclave_db::DatabaseWriteOperations;
use enclave_executor::{BatchExecutor, Genesis, TransactionExecutor};
use enclave_primitives::{Batch, BlockAndReceipts, BlockInfo};
use enclave_registry::BatchRegistry;
use enclave_rollup::RollupConsumer;
use enclave_signer::SignatureValidator;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// The components shared by every node type.
///
/// All of them write through the same storage handle. The data ingestion lock serializes the
/// calls that move the head pointers.
#[derive(Debug)]
pub struct EnclaveComponents<DB, E, V> {
    pub(crate) db: DB,
    pub(crate) config: EnclaveConfig,
    pub(crate) executor: Arc<BatchExecutor<DB, E>>,
    pub(crate) registry: Arc<BatchRegistry<DB>>,
    pub(crate) block_processor: L1BlockProcessor<DB, V>,
    pub(crate) rollup_consumer: RollupConsumer<DB, E>,
    data_ingestion: Mutex<()>,
}

impl<DB, E, V> EnclaveComponents<DB, E, V>
where
    DB: DatabaseWriteOperations + Clone,
    E: TransactionExecutor,
    V: AttestationVerifier,
{
    /// Wires the components on top of `db`.
    pub fn new(
        db: DB,
        sandbox: E,
        verifier: V,
        genesis: Genesis,
        config: EnclaveConfig,
    ) -> Result<Self, NodeError> {
        let executor = Arc::new(BatchExecutor::new(db.clone(), sandbox, config.chain, genesis)?);
        let registry = Arc::new(BatchRegistry::new(db.clone())?);
        let secrets = SharedSecretProcessor::new(
            db.clone(),
            verifier,
            config.enclave_id,
            config.chain.management_contract,
        );
        let block_processor =
            L1BlockProcessor::new(db.clone(), executor.cross_chain().clone(), secrets);
        let rollup_consumer = RollupConsumer::new(
            db.clone(),
            executor.clone(),
            registry.clone(),
            SignatureValidator::new(db.clone(), config.sequencer_id),
            config.chain.management_contract,
        );

        Ok(Self {
            db,
            config,
            executor,
            registry,
            block_processor,
            rollup_consumer,
            data_ingestion: Mutex::new(()),
        })
    }

    /// Returns the storage handle.
    pub const fn db(&self) -> &DB {
        &self.db
    }

    /// Returns the node configuration.
    pub const fn config(&self) -> &EnclaveConfig {
        &self.config
    }

    /// Returns the batch registry.
    pub const fn registry(&self) -> &Arc<BatchRegistry<DB>> {
        &self.registry
    }

    /// Acquires the data ingestion lock.
    pub(crate) fn lock_ingestion(&self) -> MutexGuard<'_, ()> {
        self.data_ingestion.lock()
    }

    /// Ingests the L1 block, then consumes the rollup it carries.
    ///
    /// A duplicate rollup is ignored. Any other rollup error fails the call, the block itself
    /// stays stored.
    pub(crate) fn ingest_block(
        &self,
        block: &BlockAndReceipts,
        is_latest: bool,
    ) -> Result<BlockSubmissionResponse, NodeError> {
        let _guard = self.lock_ingestion();
        let ingestion = self.block_processor.process(block, is_latest)?;

        let consumed_rollup = match self.rollup_consumer.process_l1_block(block) {
            Ok(rollup) => rollup.map(|rollup| rollup.hash()),
            Err(err) if err.is_duplicate() => {
                tracing::debug!(target: "enclave::node", block = ?ingestion.block, "Ignoring duplicate rollup");
                None
            }
            Err(err) => {
                tracing::error!(target: "enclave::node", block = ?ingestion.block, %err, "Failed to process rollups of L1 block");
                return Err(err.into());
            }
        };

        Ok(BlockSubmissionResponse { ingestion, consumed_rollup })
    }

    /// Returns the head batch, if any batch was stored.
    pub(crate) fn head_batch(&self) -> Result<Option<Batch>, NodeError> {
        match self.db.fetch_head_batch() {
            Ok(batch) => Ok(Some(batch)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Returns the L1 head, if any block was ingested.
    pub(crate) fn l1_head(&self) -> Result<Option<BlockInfo>, NodeError> {
        match self.db.fetch_head_block() {
            Ok(block) => Ok(Some(BlockInfo::from(&block))),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Returns the status of the node.
    pub(crate) fn status(&self, node_type: NodeType) -> Result<EnclaveStatus, NodeError> {
        Ok(EnclaveStatus {
            node_type,
            l1_head: self.l1_head()?,
            head_batch: self.head_batch()?.map(|batch| batch.hash()),
            head_batch_seq: self.registry.head_batch_seq(),
        })
    }
}
