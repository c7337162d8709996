use crate::{
    constants::L2_GENESIS_HEIGHT,
    signature::{
        decode_list, decode_signature, encode_list_header, encode_signature, list_length,
        signature_length,
    },
    CrossChainMessage, L2Transaction,
};
use alloy_primitives::{keccak256, Address, Signature, B256};
use alloy_rlp::{BufMut, Decodable, Encodable, RlpDecodable, RlpEncodable};

/// The header of an L2 batch. The batch hash is the hash of this header, the sequencer signature
/// is kept outside of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct BatchHeader {
    /// The hash of the parent batch.
    pub parent_hash: B256,
    /// The post-state root.
    pub root: B256,
    /// The merkle root of the batch transactions.
    pub tx_hash: B256,
    /// The merkle root of the batch receipts.
    pub receipt_hash: B256,
    /// The height of the batch.
    pub number: u64,
    /// The sequencer order number, strictly increasing and gap-free over every produced batch.
    pub sequencer_order_no: u64,
    /// The gas limit of the batch.
    pub gas_limit: u64,
    /// The gas consumed by the batch.
    pub gas_used: u64,
    /// The timestamp of the batch.
    pub time: u64,
    /// The base fee of the batch.
    pub base_fee: u64,
    /// The sequencer fee recipient.
    pub coinbase: Address,
    /// The hash of the L1 block the batch is anchored to.
    pub l1_proof: B256,
    /// The randomness of the batch.
    pub mix_digest: B256,
    /// The outbound cross chain messages emitted by the batch.
    pub cross_chain_messages: Vec<CrossChainMessage>,
    /// The hash of the latest L1 block whose inbound messages the batch delivered.
    pub latest_inbound_cross_chain_hash: B256,
    /// The height of the latest L1 block whose inbound messages the batch delivered.
    pub latest_inbound_cross_chain_height: u64,
}

impl BatchHeader {
    /// Returns the hash of the header.
    pub fn hash(&self) -> B256 {
        keccak256(alloy_rlp::encode(self))
    }
}

/// An L2 batch: the atomic unit of the L2 state transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    /// The batch header.
    pub header: BatchHeader,
    /// The sequencer signature over the header hash.
    pub signature: Option<Signature>,
    /// The transactions of the batch, in execution order.
    pub transactions: Vec<L2Transaction>,
}

impl Batch {
    /// Returns the hash of the batch.
    pub fn hash(&self) -> B256 {
        self.header.hash()
    }

    /// Returns the height of the batch.
    pub const fn number(&self) -> u64 {
        self.header.number
    }

    /// Returns the sequencer order number of the batch.
    pub const fn seq_no(&self) -> u64 {
        self.header.sequencer_order_no
    }

    /// Returns the hash of the parent batch.
    pub const fn parent_hash(&self) -> B256 {
        self.header.parent_hash
    }

    /// Returns the hash of the L1 block the batch is anchored to.
    pub const fn l1_proof(&self) -> B256 {
        self.header.l1_proof
    }

    /// Returns true if this is the genesis batch.
    pub const fn is_genesis(&self) -> bool {
        self.header.number == L2_GENESIS_HEIGHT
    }

    /// Returns the hashes of the batch transactions.
    pub fn tx_hashes(&self) -> Vec<B256> {
        self.transactions.iter().map(L2Transaction::hash).collect()
    }

    /// Returns the encoded size of the batch in bytes.
    pub fn size(&self) -> usize {
        self.length()
    }

    fn payload_length(&self) -> usize {
        self.header.length() +
            signature_length(self.signature.as_ref()) +
            self.transactions.length()
    }
}

impl Encodable for Batch {
    fn encode(&self, out: &mut dyn BufMut) {
        encode_list_header(self.payload_length(), out);
        self.header.encode(out);
        encode_signature(self.signature.as_ref(), out);
        self.transactions.encode(out);
    }

    fn length(&self) -> usize {
        list_length(self.payload_length())
    }
}

impl Decodable for Batch {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        decode_list(buf, |buf| {
            let header = BatchHeader::decode(buf)?;
            let signature = decode_signature(buf)?;
            let transactions = Vec::<L2Transaction>::decode(buf)?;
            Ok(Self { header, signature, transactions })
        })
    }
}
