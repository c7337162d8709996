use crate::signature::{
    decode_list, decode_signature, encode_list_header, encode_signature, list_length,
    signature_length,
};
use alloy_primitives::{keccak256, Address, Bytes, Signature, SignatureError, B256, U256};
use alloy_rlp::{BufMut, Decodable, Encodable, RlpDecodable, RlpEncodable};

/// The unsigned content of an [`L2Transaction`].
#[derive(Debug, Clone, Default, PartialEq, Eq, RlpEncodable, RlpDecodable)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct TxRequest {
    /// The chain the transaction is valid on.
    pub chain_id: u64,
    /// The sender nonce.
    pub nonce: u64,
    /// The maximum amount of gas the transaction may consume.
    pub gas_limit: u64,
    /// The recipient. The zero address deploys a contract.
    pub to: Address,
    /// The transferred value.
    pub value: U256,
    /// The call data.
    pub input: Bytes,
}

impl TxRequest {
    /// Returns the hash the sender signs.
    pub fn signature_hash(&self) -> B256 {
        keccak256(alloy_rlp::encode(self))
    }

    /// Attaches the provided signature.
    pub const fn into_signed(self, signature: Signature) -> L2Transaction {
        L2Transaction { request: self, signature }
    }
}

/// A signed L2 transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L2Transaction {
    /// The signed content.
    pub request: TxRequest,
    /// The sender signature over [`TxRequest::signature_hash`].
    pub signature: Signature,
}

impl L2Transaction {
    /// Returns the hash of the signed transaction.
    pub fn hash(&self) -> B256 {
        keccak256(alloy_rlp::encode(self))
    }

    /// Recovers the sender of the transaction from its signature.
    pub fn recover_sender(&self) -> Result<Address, SignatureError> {
        self.signature.recover_address_from_prehash(&self.request.signature_hash())
    }

    /// Returns the chain id of the transaction.
    pub const fn chain_id(&self) -> u64 {
        self.request.chain_id
    }

    /// Returns the sender nonce of the transaction.
    pub const fn nonce(&self) -> u64 {
        self.request.nonce
    }

    /// Returns the recipient of the transaction.
    pub const fn to(&self) -> Address {
        self.request.to
    }

    /// Returns the encoded size of the transaction in bytes.
    pub fn size(&self) -> usize {
        self.length()
    }

    fn payload_length(&self) -> usize {
        self.request.length() + signature_length(Some(&self.signature))
    }
}

impl Encodable for L2Transaction {
    fn encode(&self, out: &mut dyn BufMut) {
        encode_list_header(self.payload_length(), out);
        self.request.encode(out);
        encode_signature(Some(&self.signature), out);
    }

    fn length(&self) -> usize {
        list_length(self.payload_length())
    }
}

impl Decodable for L2Transaction {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        decode_list(buf, |buf| {
            let request = TxRequest::decode(buf)?;
            let signature = decode_signature(buf)?
                .ok_or(alloy_rlp::Error::Custom("missing transaction signature"))?;
            Ok(Self { request, signature })
        })
    }
}
