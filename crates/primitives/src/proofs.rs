use crate::{L2Transaction, Receipt};
use alloy_consensus::proofs::ordered_trie_root_with_encoder;
use alloy_primitives::B256;
use alloy_rlp::Encodable;

/// Returns the merkle root of the provided transactions. Empty input yields the empty root hash.
pub fn transactions_root(transactions: &[L2Transaction]) -> B256 {
    ordered_trie_root_with_encoder(transactions, |tx, buf| tx.encode(buf))
}

/// Returns the merkle root of the provided receipts. Empty input yields the empty root hash.
pub fn receipts_root(receipts: &[Receipt]) -> B256 {
    ordered_trie_root_with_encoder(receipts, |receipt, buf| receipt.encode(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_consensus::EMPTY_ROOT_HASH;

    #[test]
    fn test_empty_roots() {
        assert_eq!(transactions_root(&[]), EMPTY_ROOT_HASH);
        assert_eq!(receipts_root(&[]), EMPTY_ROOT_HASH);
    }

    #[test]
    fn test_receipts_root_is_order_sensitive() {
        let a = Receipt { gas_used: 1, success: true, ..Default::default() };
        let b = Receipt { gas_used: 2, success: true, ..Default::default() };
        assert_ne!(receipts_root(&[a.clone(), b.clone()]), receipts_root(&[b, a]));
    }
}
