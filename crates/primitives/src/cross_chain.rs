use alloy_primitives::{keccak256, Address, Bytes, B256};
use alloy_rlp::{RlpDecodable, RlpEncodable};

/// A message published on one layer to be delivered on the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, RlpEncodable, RlpDecodable)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct CrossChainMessage {
    /// The address that published the message.
    pub sender: Address,
    /// The per-sender sequence of the message.
    pub sequence: u64,
    /// The nonce chosen by the sender.
    pub nonce: u64,
    /// The topic of the message.
    pub topic: u64,
    /// The message payload.
    pub payload: Bytes,
    /// The number of confirmations the sender requested before delivery.
    pub consistency_level: u8,
}

impl CrossChainMessage {
    /// Returns the hash of the message.
    pub fn hash(&self) -> B256 {
        keccak256(alloy_rlp::encode(self))
    }
}

/// An ordered list of [`CrossChainMessage`]s.
pub type CrossChainMessages = Vec<CrossChainMessage>;
