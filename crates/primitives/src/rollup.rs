use crate::{
    signature::{
        decode_list, decode_signature, encode_list_header, encode_signature, list_length,
        signature_length,
    },
    Batch,
};
use alloy_primitives::{keccak256, Address, Bytes, Signature, B256};
use alloy_rlp::{BufMut, Decodable, Encodable, RlpDecodable, RlpEncodable};

/// The header of a [`Rollup`].
#[derive(Debug, Clone, Default, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct RollupHeader {
    /// The hash of the previous rollup, zero for the first rollup.
    pub parent_hash: B256,
    /// The hash of the L1 block the last batch of the rollup is anchored to.
    pub l1_proof: B256,
    /// The height of the L1 block the last batch of the rollup is anchored to.
    pub l1_proof_number: u64,
    /// The sequencer fee recipient.
    pub coinbase: Address,
    /// The sequencer order number of the first batch.
    pub first_batch_seq_no: u64,
    /// The sequencer order number of the last batch.
    pub last_batch_seq_no: u64,
    /// The hash of the last batch.
    pub head_batch_hash: B256,
    /// The hash of the encoded batches.
    pub payload_hash: B256,
}

impl RollupHeader {
    /// Returns the hash of the header.
    pub fn hash(&self) -> B256 {
        keccak256(alloy_rlp::encode(self))
    }
}

/// A signed bundle of consecutive batches published to L1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rollup {
    /// The rollup header.
    pub header: RollupHeader,
    /// The sequencer signature over the header hash.
    pub signature: Option<Signature>,
    /// The batches of the rollup, ordered by sequencer order number.
    pub batches: Vec<Batch>,
}

impl Rollup {
    /// Returns the hash of the rollup.
    pub fn hash(&self) -> B256 {
        self.header.hash()
    }

    /// Returns the hash of the encoded batches of the rollup.
    pub fn payload_hash(batches: &[Batch]) -> B256 {
        let mut out = Vec::new();
        alloy_rlp::encode_list::<_, Batch>(batches, &mut out);
        keccak256(out)
    }

    /// Returns true if the sequencer order numbers of the batches are strictly consecutive and
    /// match the header range.
    pub fn is_contiguous(&self) -> bool {
        let consecutive = self.batches.windows(2).all(|w| w[0].seq_no() + 1 == w[1].seq_no());
        let bounds = match (self.batches.first(), self.batches.last()) {
            (Some(first), Some(last)) => {
                first.seq_no() == self.header.first_batch_seq_no &&
                    last.seq_no() == self.header.last_batch_seq_no
            }
            _ => false,
        };
        consecutive && bounds
    }

    /// Returns the encoded rollup, as published in an L1 transaction.
    pub fn to_bytes(&self) -> Bytes {
        alloy_rlp::encode(self).into()
    }

    /// Decodes a rollup published in an L1 transaction.
    pub fn from_bytes(mut bytes: &[u8]) -> alloy_rlp::Result<Self> {
        Self::decode(&mut bytes)
    }

    fn payload_length(&self) -> usize {
        self.header.length() + signature_length(self.signature.as_ref()) + self.batches.length()
    }
}

impl Encodable for Rollup {
    fn encode(&self, out: &mut dyn BufMut) {
        encode_list_header(self.payload_length(), out);
        self.header.encode(out);
        encode_signature(self.signature.as_ref(), out);
        self.batches.encode(out);
    }

    fn length(&self) -> usize {
        list_length(self.payload_length())
    }
}

impl Decodable for Rollup {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        decode_list(buf, |buf| {
            let header = RollupHeader::decode(buf)?;
            let signature = decode_signature(buf)?;
            let batches = Vec::<Batch>::decode(buf)?;
            Ok(Self { header, signature, batches })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BatchHeader;

    fn batch(seq: u64) -> Batch {
        Batch {
            header: BatchHeader { sequencer_order_no: seq, number: seq - 1, ..Default::default() },
            ..Default::default()
        }
    }

    #[test]
    fn test_contiguity() {
        let batches = vec![batch(2), batch(3), batch(4)];
        let header = RollupHeader {
            first_batch_seq_no: 2,
            last_batch_seq_no: 4,
            payload_hash: Rollup::payload_hash(&batches),
            ..Default::default()
        };
        let rollup = Rollup { header: header.clone(), signature: None, batches };
        assert!(rollup.is_contiguous());

        let gap = Rollup { header, signature: None, batches: vec![batch(2), batch(4)] };
        assert!(!gap.is_contiguous());

        let decoded = Rollup::from_bytes(&rollup.to_bytes()).unwrap();
        assert_eq!(decoded, rollup);
    }

    #[test]
    fn test_empty_rollup_is_not_contiguous() {
        assert!(!Rollup::default().is_contiguous());
    }
}
