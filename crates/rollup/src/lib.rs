//! Production and consumption of rollups.
//!
//! The [`RollupProducer`] packs consecutive batches into signed rollups for publication on L1.
//! The [`RollupConsumer`] extracts rollups from L1 blocks, validates them and replays the
//! batches it does not know yet.

mod consumer;
pub use consumer::RollupConsumer;

mod error;
pub use error::RollupError;

mod metrics;
pub use metrics::{ConsumerMetrics, ProducerMetrics};

mod producer;
pub use producer::RollupProducer;

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};
    use alloy_signer_local::PrivateKeySigner;
    use enclave_db::{Database, DatabaseReadOperations, DatabaseWriteOperations};
    use enclave_executor::{test_utils::MockExecutor, BatchExecutionContext, BatchExecutor, Genesis};
    use enclave_l1::ManagementContractTx;
    use enclave_primitives::{
        test_utils::{l1_chain, next_block, TestWallet},
        Batch, BlockAndReceipts, ChainConfig, L1Block, Rollup, RollupSizeLimiter,
        UnboundedRollupLimiter,
    };
    use enclave_registry::BatchRegistry;
    use enclave_signer::{EnclaveSigner, SignatureValidator};
    use std::sync::Arc;

    const SEQUENCER_ID: Address = Address::repeat_byte(0x5e);

    struct Node {
        db: Arc<Database>,
        executor: Arc<BatchExecutor<Arc<Database>, MockExecutor>>,
        registry: Arc<BatchRegistry<Arc<Database>>>,
    }

    impl Node {
        fn new(chain: &[L1Block], wallet: &TestWallet, sequencer_key: Address) -> Self {
            let db = Arc::new(Database::new());
            for block in chain {
                db.store_block(block, &[], &[]).unwrap();
            }
            db.store_attested_key(SEQUENCER_ID, sequencer_key).unwrap();
            let genesis = Genesis::new([(wallet.address(), U256::from(1_000_000u64))]);
            let executor = Arc::new(
                BatchExecutor::new(db.clone(), MockExecutor, ChainConfig::default(), genesis)
                    .unwrap(),
            );
            let registry = Arc::new(BatchRegistry::new(db.clone()).unwrap());
            Self { db, executor, registry }
        }

        fn consumer(&self) -> RollupConsumer<Arc<Database>, MockExecutor> {
            RollupConsumer::new(
                self.db.clone(),
                self.executor.clone(),
                self.registry.clone(),
                SignatureValidator::new(self.db.clone(), SEQUENCER_ID),
                ChainConfig::default().management_contract,
            )
        }

        /// Creates the genesis batch and one batch per remaining block.
        fn sequence(&self, chain: &[L1Block], wallet: &mut TestWallet, signer: &EnclaveSigner) -> Vec<Batch> {
            let consumer = self.consumer();
            let (genesis, deploy_tx) =
                self.executor.create_genesis_state(chain[0].hash(), chain[0].timestamp()).unwrap();
            let genesis = signer.sign_batch(genesis).unwrap();
            consumer.store_executed_batch(&genesis, &[]).unwrap();

            let mut batches = vec![genesis];
            let mut pending = vec![deploy_tx];
            for block in &chain[1..] {
                pending.push(wallet.transfer(Address::repeat_byte(1), U256::from(1)));
                let parent = batches.last().unwrap();
                let computed = self
                    .executor
                    .compute_batch(&BatchExecutionContext {
                        block_hash: block.hash(),
                        parent_hash: parent.hash(),
                        transactions: std::mem::take(&mut pending),
                        at_time: block.timestamp(),
                        randomness: Default::default(),
                        creator: signer.address(),
                        seq_no: parent.seq_no() + 1,
                    })
                    .unwrap();
                self.executor.commit(&computed).unwrap();
                let batch = signer.sign_batch(computed.batch).unwrap();
                consumer.store_executed_batch(&batch, &computed.receipts).unwrap();
                batches.push(batch);
            }
            batches
        }
    }

    fn publish(parent: &L1Block, rollups: Vec<Rollup>) -> BlockAndReceipts {
        let contract = ChainConfig::default().management_contract;
        let txs = rollups
            .into_iter()
            .enumerate()
            .map(|(nonce, rollup)| {
                ManagementContractTx::from(rollup).into_l1_transaction(
                    Address::repeat_byte(0xee),
                    nonce as u64,
                    contract,
                )
            })
            .collect();
        BlockAndReceipts::all_successful(next_block(parent, 0, txs))
    }

    type Setup = (Node, Node, Vec<L1Block>, Vec<Batch>, RollupProducer<Arc<Database>>);

    fn setup() -> Setup {
        let (setup, _) = setup_with_known_blocks(5);
        setup
    }

    /// Sequences five batches over five blocks. The validator only knows the first `known`
    /// blocks.
    fn setup_with_known_blocks(known: usize) -> (Setup, EnclaveSigner) {
        let chain = l1_chain(100, 5);
        let signer = EnclaveSigner::new(PrivateKeySigner::random());
        let mut wallet = TestWallet::random(ChainConfig::default().chain_id);

        let sequencer = Node::new(&chain, &wallet, signer.address());
        let validator = Node::new(&chain[..known], &wallet, signer.address());
        let batches = sequencer.sequence(&chain, &mut wallet, &signer);
        let producer =
            RollupProducer::new(sequencer.db.clone(), sequencer.registry.clone(), signer.clone());
        ((sequencer, validator, chain, batches, producer), signer)
    }

    #[test]
    fn test_rollup_round_trip() {
        let (_sequencer, validator, chain, batches, producer) = setup();
        let rollup = producer.create_rollup(1, u64::MAX, &mut UnboundedRollupLimiter).unwrap();
        assert_eq!(rollup.header.first_batch_seq_no, 1);
        assert_eq!(rollup.header.last_batch_seq_no, 5);
        assert_eq!(rollup.header.l1_proof, chain[4].hash());
        assert!(rollup.is_contiguous());

        let block = publish(&chain[4], vec![rollup.clone()]);
        validator.db.store_block(&block.block, &[], &[]).unwrap();
        let consumed = validator.consumer().process_l1_block(&block).unwrap();

        assert_eq!(consumed, Some(rollup.clone()));
        assert_eq!(validator.registry.head_batch_seq(), Some(5));
        for batch in &batches {
            assert_eq!(validator.db.fetch_batch_by_seq_no(batch.seq_no()).unwrap().hash(), batch.hash());
        }
        assert_eq!(validator.db.fetch_head_batch().unwrap().hash(), batches[4].hash());
        assert_eq!(validator.db.fetch_latest_rollup().unwrap(), rollup);

        let err = validator.consumer().process_rollup(&rollup).unwrap_err();
        assert!(err.is_duplicate());
    }

    #[test]
    fn test_rollup_respects_limiter_and_height() {
        let (_sequencer, _validator, chain, batches, producer) = setup();

        let rollup = producer.create_rollup(2, chain[2].number(), &mut UnboundedRollupLimiter).unwrap();
        assert_eq!(rollup.batches, batches[1..3].to_vec());

        let mut limiter = RollupSizeLimiter::new(batches[1].size());
        let rollup = producer.create_rollup(2, u64::MAX, &mut limiter).unwrap();
        assert_eq!(rollup.batches.len(), 1);

        let err = producer.create_rollup(6, u64::MAX, &mut UnboundedRollupLimiter).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_block_with_two_signed_rollups_is_rejected() {
        let (_sequencer, validator, chain, _, producer) = setup();
        let first = producer.create_rollup(1, chain[2].number(), &mut UnboundedRollupLimiter).unwrap();
        let second = producer.create_rollup(1, u64::MAX, &mut UnboundedRollupLimiter).unwrap();

        let block = publish(&chain[4], vec![first, second]);
        let err = validator.consumer().process_l1_block(&block).unwrap_err();
        assert!(matches!(err, RollupError::MultipleRollups { count: 2, .. }));
        assert_eq!(validator.registry.head_batch_seq(), None);
    }

    #[test]
    fn test_unsigned_and_tampered_rollups() {
        let (_sequencer, validator, chain, _, producer) = setup();
        let rollup = producer.create_rollup(1, u64::MAX, &mut UnboundedRollupLimiter).unwrap();

        // An unsigned rollup is ignored.
        let unsigned = Rollup { signature: None, ..rollup.clone() };
        let block = publish(&chain[4], vec![unsigned]);
        assert_eq!(validator.consumer().process_l1_block(&block).unwrap(), None);

        // A batch replaced under a valid header signature breaks the payload commitment.
        let mut tampered = rollup;
        tampered.batches[2].header.time += 1;
        let err = validator.consumer().process_rollup(&tampered).unwrap_err();
        assert!(matches!(err, RollupError::PayloadMismatch(_)));
        assert!(validator.db.fetch_rollup(tampered.hash()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_rollup_with_sequence_gap_is_rejected() {
        let ((_sequencer, validator, chain, batches, producer), signer) =
            setup_with_known_blocks(5);
        let mut rollup = producer.create_rollup(1, u64::MAX, &mut UnboundedRollupLimiter).unwrap();

        // Drop a middle batch and sign the result, the commitment and header range still match.
        rollup.batches.remove(2);
        rollup.header.payload_hash = Rollup::payload_hash(&rollup.batches);
        rollup.signature = None;
        let rollup = signer.sign_rollup(rollup).unwrap();

        let block = publish(&chain[4], vec![rollup.clone()]);
        let err = validator.consumer().process_l1_block(&block).unwrap_err();
        assert!(matches!(err, RollupError::NonContiguousRollup(hash) if hash == rollup.hash()));
        assert!(validator.db.fetch_rollup(rollup.hash()).unwrap_err().is_not_found());
        for batch in &batches {
            assert!(validator.db.fetch_batch(batch.hash()).unwrap_err().is_not_found());
        }
        assert_eq!(validator.registry.head_batch_seq(), None);
    }

    #[test]
    fn test_batches_anchored_to_unknown_blocks_are_skipped() {
        let ((_sequencer, validator, _chain, batches, producer), _) = setup_with_known_blocks(3);
        let rollup = producer.create_rollup(1, u64::MAX, &mut UnboundedRollupLimiter).unwrap();
        assert_eq!(rollup.batches.len(), 5);

        validator.consumer().process_rollup(&rollup).unwrap();

        for batch in &batches[..3] {
            assert_eq!(validator.db.fetch_batch(batch.hash()).unwrap().hash(), batch.hash());
        }
        for batch in &batches[3..] {
            assert!(validator.db.fetch_batch(batch.hash()).unwrap_err().is_not_found());
        }
        assert_eq!(validator.registry.head_batch_seq(), Some(3));
        assert_eq!(validator.db.fetch_head_batch().unwrap().hash(), batches[2].hash());
        assert_eq!(validator.db.fetch_latest_rollup().unwrap(), rollup);
    }
}
