use alloy_primitives::{Address, Bytes, B256};
use alloy_rlp::{RlpDecodable, RlpEncodable};

/// A log emitted during the execution of an L2 transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct Log {
    /// The emitting contract.
    pub address: Address,
    /// The indexed topics.
    pub topics: Vec<B256>,
    /// The log data.
    pub data: Bytes,
}

/// The outcome of executing an L2 transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct Receipt {
    /// The hash of the executed transaction.
    pub tx_hash: B256,
    /// Whether the transaction succeeded.
    pub success: bool,
    /// The gas consumed by the transaction.
    pub gas_used: u64,
    /// The logs emitted by the transaction.
    pub logs: Vec<Log>,
}

/// The receipts of a batch, in execution order.
pub type Receipts = Vec<Receipt>;
