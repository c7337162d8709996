//! Enclave integration tests.
//!
//! A [`TestNetwork`] runs a sequencer and a validator side by side on the same L1 chain.

use alloy_primitives::{Address, U256};
use alloy_signer_local::PrivateKeySigner;
use enclave_node::{
    test_utils::{rollup_block, secret_block, sequencer, validator, TestSequencer, TestValidator},
    BlockSubmissionResponse, EnclaveNode,
};
use enclave_primitives::{
    test_utils::{l1_chain, l1_chain_from, TestWallet},
    BlockAndReceipts, ChainConfig, L1Block, Rollup,
};

/// The enclave id of the validator of the [`TestNetwork`].
pub const VALIDATOR_ID: Address = Address::repeat_byte(0x0a);

/// Initializes a tracing subscriber for tests, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A sequencer and a validator fed with the same L1 blocks.
#[derive(Debug)]
pub struct TestNetwork {
    /// The sequencer.
    pub sequencer: TestSequencer,
    /// The validator.
    pub validator: TestValidator,
    /// The key the sequencer signs with.
    pub signer: PrivateKeySigner,
    /// An account funded at genesis.
    pub wallet: TestWallet,
    /// The blocks fed to both nodes, oldest first. Forks are appended after the blocks they
    /// replace.
    pub chain: Vec<L1Block>,
    head: L1Block,
}

impl TestNetwork {
    /// Returns a network whose L1 chain starts one block below `genesis_height`. The block at
    /// `genesis_height` attests the sequencer key.
    pub fn new(genesis_height: u64) -> eyre::Result<Self> {
        init_tracing();
        let wallet = TestWallet::random(ChainConfig::default().chain_id);
        let signer = PrivateKeySigner::random();
        let first = l1_chain(genesis_height - 1, 1).remove(0);
        let mut network = Self {
            sequencer: sequencer(signer.clone(), &[wallet.address()])?,
            validator: validator(VALIDATOR_ID, &[wallet.address()])?,
            wallet,
            chain: Vec::new(),
            head: first.clone(),
            signer,
        };

        network.mine(BlockAndReceipts::all_successful(first.clone()))?;
        network.mine(secret_block(&first, network.signer.address()))?;
        Ok(network)
    }

    /// Returns the latest mined block.
    pub const fn head(&self) -> &L1Block {
        &self.head
    }

    /// Feeds `block` to both nodes. Returns the response of the validator.
    pub fn mine(&mut self, block: BlockAndReceipts) -> eyre::Result<BlockSubmissionResponse> {
        self.sequencer.submit_l1_block(&block, true)?;
        let response = self.validator.submit_l1_block(&block, true)?;
        self.head = block.block.clone();
        self.chain.push(block.block);
        Ok(response)
    }

    /// Mines an empty block on top of the head.
    pub fn mine_empty(&mut self) -> eyre::Result<()> {
        let block = l1_chain_from(self.head(), 1, 0).remove(0);
        self.mine(BlockAndReceipts::all_successful(block))?;
        Ok(())
    }

    /// Publishes `rollup` in a block on top of the head.
    pub fn publish(&mut self, rollup: Rollup) -> eyre::Result<BlockSubmissionResponse> {
        let block = rollup_block(self.head(), vec![rollup]);
        self.mine(block)
    }

    /// Submits a transfer from the funded wallet to the sequencer.
    pub fn submit_transfer(&mut self, value: u64) -> eyre::Result<()> {
        let tx = self.wallet.transfer(Address::repeat_byte(0x01), U256::from(value));
        self.sequencer.submit_tx(tx)?;
        Ok(())
    }
}
