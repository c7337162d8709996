use alloy_primitives::{keccak256, Address, Bytes, B256};
use alloy_rlp::{RlpDecodable, RlpEncodable};
use std::collections::HashMap;

/// Information about a block.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BlockInfo {
    /// The block number.
    pub number: u64,
    /// The block hash.
    pub hash: B256,
}

impl BlockInfo {
    /// Returns a new instance of [`BlockInfo`].
    pub const fn new(number: u64, hash: B256) -> Self {
        Self { number, hash }
    }
}

impl From<&L1Block> for BlockInfo {
    fn from(value: &L1Block) -> Self {
        Self { number: value.number(), hash: value.hash() }
    }
}

#[cfg(feature = "arbitrary")]
impl arbitrary::Arbitrary<'_> for BlockInfo {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        let number = u.int_in_range(0..=u32::MAX)?;
        let hash = B256::arbitrary(u)?;
        Ok(Self { number: number as u64, hash })
    }
}

/// The header of a base layer block.
#[derive(Debug, Clone, Default, PartialEq, Eq, RlpEncodable, RlpDecodable)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct L1BlockHeader {
    /// The hash of the parent block.
    pub parent_hash: B256,
    /// The block number.
    pub number: u64,
    /// The block timestamp.
    pub timestamp: u64,
    /// The commitment to the block transactions.
    pub transactions_root: B256,
    /// Arbitrary extra data, used by block producers to distinguish siblings.
    pub extra_data: Bytes,
}

impl L1BlockHeader {
    /// Computes the hash of the header.
    pub fn hash_slow(&self) -> B256 {
        keccak256(alloy_rlp::encode(self))
    }
}

/// A transaction of the base layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, RlpEncodable, RlpDecodable)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct L1Transaction {
    /// The sender nonce.
    pub nonce: u64,
    /// The sender of the transaction.
    pub from: Address,
    /// The recipient of the transaction.
    pub to: Address,
    /// The call data.
    pub input: Bytes,
}

impl L1Transaction {
    /// Returns the hash of the transaction.
    pub fn hash(&self) -> B256 {
        keccak256(alloy_rlp::encode(self))
    }
}

/// The execution outcome of an [`L1Transaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L1Receipt {
    /// The hash of the transaction the receipt belongs to.
    pub tx_hash: B256,
    /// Whether the transaction succeeded.
    pub success: bool,
}

/// A base layer block, immutable once produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct L1Block {
    /// The block header.
    pub header: L1BlockHeader,
    /// The block transactions.
    pub transactions: Vec<L1Transaction>,
}

impl L1Block {
    /// Returns a new block on top of `parent_hash` at `number`, committing to `transactions`.
    pub fn new(
        parent_hash: B256,
        number: u64,
        timestamp: u64,
        extra_data: Bytes,
        transactions: Vec<L1Transaction>,
    ) -> Self {
        let transactions_root = alloy_consensus::proofs::ordered_trie_root_with_encoder(
            &transactions,
            |tx, buf| alloy_rlp::Encodable::encode(tx, buf),
        );
        let header =
            L1BlockHeader { parent_hash, number, timestamp, transactions_root, extra_data };
        Self { header, transactions }
    }

    /// Returns the hash of the block.
    pub fn hash(&self) -> B256 {
        self.header.hash_slow()
    }

    /// Returns the number of the block.
    pub const fn number(&self) -> u64 {
        self.header.number
    }

    /// Returns the hash of the parent block.
    pub const fn parent_hash(&self) -> B256 {
        self.header.parent_hash
    }

    /// Returns the timestamp of the block.
    pub const fn timestamp(&self) -> u64 {
        self.header.timestamp
    }
}

/// An [`L1Block`] together with the receipts of its transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockAndReceipts {
    /// The block.
    pub block: L1Block,
    /// The receipts of the block transactions.
    pub receipts: Vec<L1Receipt>,
}

impl BlockAndReceipts {
    /// Returns a new [`BlockAndReceipts`].
    pub const fn new(block: L1Block, receipts: Vec<L1Receipt>) -> Self {
        Self { block, receipts }
    }

    /// Returns a [`BlockAndReceipts`] where every transaction of the block succeeded.
    pub fn all_successful(block: L1Block) -> Self {
        let receipts = block
            .transactions
            .iter()
            .map(|tx| L1Receipt { tx_hash: tx.hash(), success: true })
            .collect();
        Self { block, receipts }
    }

    /// Returns the transactions of the block that have a successful receipt, in block order.
    /// Transactions without a receipt are considered failed.
    pub fn successful_transactions(&self) -> Vec<&L1Transaction> {
        let outcomes: HashMap<B256, bool> =
            self.receipts.iter().map(|receipt| (receipt.tx_hash, receipt.success)).collect();
        self.block
            .transactions
            .iter()
            .filter(|tx| outcomes.get(&tx.hash()).copied().unwrap_or_default())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_transactions_skips_failed_and_missing_receipts() {
        let txs: Vec<_> = (0..3)
            .map(|nonce| L1Transaction { nonce, ..Default::default() })
            .collect();
        let block = L1Block::new(B256::ZERO, 1, 12, Bytes::new(), txs.clone());
        let receipts = vec![
            L1Receipt { tx_hash: txs[0].hash(), success: true },
            L1Receipt { tx_hash: txs[1].hash(), success: false },
        ];
        let block = BlockAndReceipts::new(block, receipts);

        assert_eq!(block.successful_transactions(), vec![&txs[0]]);
    }

    #[test]
    fn test_block_hash_commits_to_extra_data() {
        let a = L1Block::new(B256::ZERO, 1, 12, Bytes::from_static(b"a"), vec![]);
        let b = L1Block::new(B256::ZERO, 1, 12, Bytes::from_static(b"b"), vec![]);
        assert_ne!(a.hash(), b.hash());
        assert_eq!(BlockInfo::from(&a), BlockInfo::new(1, a.hash()));
    }
}
