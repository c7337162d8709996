use crate::abi::publishMessageCall;
use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use enclave_primitives::{CrossChainMessage, L1Transaction};

/// Decodes the cross chain message published by `tx`, if `tx` is a call to the L1 message bus.
/// The sender nonce on L1 is used as the message sequence.
pub fn try_decode_cross_chain_message(
    tx: &L1Transaction,
    message_bus: Address,
) -> Option<CrossChainMessage> {
    if tx.to != message_bus {
        return None;
    }
    let call = publishMessageCall::abi_decode(tx.input.as_ref())
        .inspect_err(|err| {
            tracing::warn!(target: "enclave::l1", tx_hash = ?tx.hash(), ?err, "Failed to decode message bus call");
        })
        .ok()?;
    Some(CrossChainMessage {
        sender: tx.from,
        sequence: tx.nonce,
        nonce: call.nonce,
        topic: call.topic,
        payload: call.payload,
        consistency_level: call.consistency_level,
    })
}

/// Returns the calldata publishing a message on the L1 message bus.
pub fn publish_message_calldata(
    nonce: u64,
    topic: u64,
    payload: Bytes,
    consistency_level: u8,
) -> Bytes {
    publishMessageCall { nonce, topic, payload, consistency_level }.abi_encode().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_published_message() {
        let bus = Address::repeat_byte(0xbb);
        let tx = L1Transaction {
            nonce: 3,
            from: Address::repeat_byte(1),
            to: bus,
            input: publish_message_calldata(9, 2, Bytes::from_static(b"hello"), 1),
        };

        let message = try_decode_cross_chain_message(&tx, bus).unwrap();
        assert_eq!(message.sender, tx.from);
        assert_eq!(message.sequence, 3);
        assert_eq!(message.nonce, 9);
        assert_eq!(message.payload, Bytes::from_static(b"hello"));

        assert!(try_decode_cross_chain_message(&tx, Address::ZERO).is_none());
    }
}
