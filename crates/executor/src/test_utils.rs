//! A minimal deterministic sandbox for tests.

use crate::{message_published_topic, TransactionExecutor, TxExecResults, TxExecutionError};
use alloy_primitives::{keccak256, Address, B256};
use alloy_rlp::Decodable;
use enclave_db::StateDb;
use enclave_primitives::{
    BatchHeader, ChainConfig, CrossChainMessage, L2Transaction, Log, Receipt,
};

/// The gas charged for every transaction.
pub const TX_GAS: u64 = 21_000;

/// Calldata starting with this byte makes a transaction revert.
pub const REVERT_MARKER: u8 = 0xfe;

/// A [`TransactionExecutor`] supporting value transfers, contract creations and the L2 message
/// bus. It charges [`TX_GAS`] per transaction and reverts calls whose input starts with
/// [`REVERT_MARKER`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MockExecutor;

impl MockExecutor {
    fn execute(
        tx: &L2Transaction,
        state: &mut StateDb,
        gas_used: u64,
        header: &BatchHeader,
        chain_config: &ChainConfig,
    ) -> Result<Receipt, TxExecutionError> {
        let sender = tx.recover_sender().map_err(|_| TxExecutionError::InvalidSignature)?;
        if tx.chain_id() != chain_config.chain_id {
            return Err(TxExecutionError::InvalidChainId(tx.chain_id()));
        }
        let expected = state.nonce(&sender);
        if tx.nonce() != expected {
            return Err(TxExecutionError::NonceMismatch { expected, got: tx.nonce() });
        }
        if gas_used + TX_GAS > header.gas_limit {
            return Err(TxExecutionError::GasLimitReached);
        }

        let mut receipt =
            Receipt { tx_hash: tx.hash(), success: true, gas_used: TX_GAS, logs: Vec::new() };
        let input = &tx.request.input;

        if input.first() == Some(&REVERT_MARKER) {
            receipt.success = false;
        } else if tx.to() == Address::ZERO {
            state.set_code_hash(sender.create(tx.nonce()), keccak256(input));
        } else if tx.to() == chain_config.l2_message_bus {
            // System transactions deliver inbound messages, user transactions publish outbound
            // ones.
            match CrossChainMessage::decode(&mut input.as_ref()) {
                Ok(message) if sender == system_sender(chain_config) => {
                    state.set_storage(tx.to(), message.hash(), B256::with_last_byte(1));
                }
                _ => {
                    let message = CrossChainMessage {
                        sender,
                        sequence: tx.nonce(),
                        nonce: tx.nonce(),
                        payload: input.clone(),
                        ..Default::default()
                    };
                    receipt.logs.push(Log {
                        address: tx.to(),
                        topics: vec![message_published_topic()],
                        data: alloy_rlp::encode(&message).into(),
                    });
                }
            }
        } else if !state.transfer(sender, tx.to(), tx.request.value) {
            return Err(TxExecutionError::InsufficientFunds);
        }

        state.increment_nonce(sender);
        Ok(receipt)
    }
}

impl TransactionExecutor for MockExecutor {
    fn execute_transactions(
        &self,
        transactions: &[L2Transaction],
        state: &mut StateDb,
        header: &BatchHeader,
        chain_config: &ChainConfig,
        from_tx_index: usize,
    ) -> TxExecResults {
        let mut gas_used = from_tx_index as u64 * TX_GAS;
        transactions
            .iter()
            .map(|tx| {
                let result = Self::execute(tx, state, gas_used, header, chain_config);
                if let Ok(receipt) = &result {
                    gas_used += receipt.gas_used;
                }
                (tx.hash(), result)
            })
            .collect()
    }
}

fn system_sender(chain_config: &ChainConfig) -> Address {
    crate::CrossChainProcessor::new(*chain_config)
        .map(|processor| processor.system_address())
        .unwrap_or_default()
}
