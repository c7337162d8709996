use crate::{L1Block, L1Transaction, L2Transaction, TxRequest};
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;

/// Test utils for arbitrary.
pub mod arbitrary;

/// The block time of the test L1 chains.
pub const L1_BLOCK_TIME: u64 = 12;

/// Returns a block extending `parent`. The `fork` byte is written in the extra data so that
/// siblings built from the same parent have distinct hashes.
pub fn next_block(parent: &L1Block, fork: u8, transactions: Vec<L1Transaction>) -> L1Block {
    L1Block::new(
        parent.hash(),
        parent.number() + 1,
        parent.timestamp() + L1_BLOCK_TIME,
        Bytes::from(vec![fork]),
        transactions,
    )
}

/// Returns a chain of `len` empty blocks, the first one at height `start` on top of a random
/// parent hash.
pub fn l1_chain(start: u64, len: usize) -> Vec<L1Block> {
    assert!(len >= 1, "chain should have a minimal length of one");

    let first =
        L1Block::new(crate::random!(B256), start, 1_700_000_000, Bytes::new(), Vec::new());
    let mut chain = Vec::with_capacity(len);
    chain.push(first);
    for i in 1..len {
        let next = next_block(&chain[i - 1], 0, Vec::new());
        chain.push(next);
    }
    chain
}

/// Returns `len` empty blocks extending `parent`, tagged with `fork`.
pub fn l1_chain_from(parent: &L1Block, len: usize, fork: u8) -> Vec<L1Block> {
    let mut blocks: Vec<L1Block> = Vec::with_capacity(len);
    for _ in 0..len {
        let next = next_block(blocks.last().unwrap_or(parent), fork, Vec::new());
        blocks.push(next);
    }
    blocks
}

/// A funded L2 account used to produce signed transactions in tests.
#[derive(Debug, Clone)]
pub struct TestWallet {
    signer: PrivateKeySigner,
    chain_id: u64,
    nonce: u64,
}

impl TestWallet {
    /// Returns a wallet with a random key.
    pub fn random(chain_id: u64) -> Self {
        Self { signer: PrivateKeySigner::random(), chain_id, nonce: 0 }
    }

    /// Returns a wallet derived from the provided key.
    pub fn from_key(key: B256, chain_id: u64) -> Self {
        let signer = PrivateKeySigner::from_bytes(&key).expect("valid key");
        Self { signer, chain_id, nonce: 0 }
    }

    /// Returns the address of the wallet.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Returns the next nonce of the wallet.
    pub const fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Signs a value transfer with the next nonce.
    pub fn transfer(&mut self, to: Address, value: U256) -> L2Transaction {
        self.next(to, value, Bytes::new())
    }

    /// Signs a contract call with the next nonce.
    pub fn call(&mut self, to: Address, input: Bytes) -> L2Transaction {
        self.next(to, U256::ZERO, input)
    }

    /// Signs the provided request as is.
    pub fn sign(&self, request: TxRequest) -> L2Transaction {
        let signature = self.signer.sign_hash_sync(&request.signature_hash()).expect("signs");
        request.into_signed(signature)
    }

    fn next(&mut self, to: Address, value: U256, input: Bytes) -> L2Transaction {
        let request = TxRequest {
            chain_id: self.chain_id,
            nonce: self.nonce,
            gas_limit: 100_000,
            to,
            value,
            input,
        };
        self.nonce += 1;
        self.sign(request)
    }
}
