use crate::ExecutorError;
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_rlp::Decodable;
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use enclave_db::{DatabaseReadOperations, StateDb};
use enclave_l1::try_decode_cross_chain_message;
use enclave_primitives::{
    constants::L1_GENESIS_HEIGHT, BlockAndReceipts, ChainConfig, CrossChainMessage,
    CrossChainMessages, L1Block, L2Transaction, Receipt, TxRequest,
};

/// The key every enclave signs synthetic transactions with. It is public: synthetic transactions
/// are authenticated by being regenerated by every enclave, not by their signature.
const SYSTEM_KEY: &str = "8dfb8083da6275ae3e4f41e3e8a8c19d028d32c9247e24530933782f2a05035b";

/// The gas limit of synthetic transactions.
const SYNTHETIC_TX_GAS_LIMIT: u64 = 1_000_000;

/// The code of the L2 message bus, deployed by the first transaction of the chain.
const MESSAGE_BUS_CODE: &[u8] = b"enclave.l2.message-bus.v1";

/// Returns the topic of the log the L2 message bus emits for each published message.
pub fn message_published_topic() -> B256 {
    keccak256("LogMessagePublished(address,uint64,uint64,uint64,bytes,uint8)")
}

/// Moves cross chain messages between the layers.
///
/// Inbound, messages published on the L1 message bus are extracted when blocks are ingested
/// and delivered on L2 as synthetic transactions. Outbound, the logs of the L2 message bus are
/// collected into the batch header.
#[derive(Debug, Clone)]
pub struct CrossChainProcessor {
    chain_config: ChainConfig,
    system_signer: PrivateKeySigner,
}

impl CrossChainProcessor {
    /// Returns a new [`CrossChainProcessor`] for the provided chain.
    pub fn new(chain_config: ChainConfig) -> Result<Self, ExecutorError> {
        Ok(Self { chain_config, system_signer: SYSTEM_KEY.parse()? })
    }

    /// Returns the address synthetic transactions are sent from.
    pub fn system_address(&self) -> Address {
        self.system_signer.address()
    }

    /// Returns the messages published to L2 by the successful transactions of the block.
    pub fn extract_l1_messages(&self, block: &BlockAndReceipts) -> CrossChainMessages {
        block
            .successful_transactions()
            .into_iter()
            .filter_map(|tx| try_decode_cross_chain_message(tx, self.chain_config.l1_message_bus))
            .collect()
    }

    /// Returns the messages published in the L1 blocks after `from` up to and including `to`, in
    /// chain order. The walk stops at the height of `from` and never goes below L1 genesis.
    pub fn retrieve_inbound_messages<DB: DatabaseReadOperations>(
        &self,
        db: &DB,
        from: &L1Block,
        to: &L1Block,
    ) -> Result<CrossChainMessages, ExecutorError> {
        let from_hash = from.hash();
        let mut blocks = Vec::new();
        let mut current = to.clone();
        while current.hash() != from_hash &&
            current.number() > from.number() &&
            current.number() > L1_GENESIS_HEIGHT
        {
            let parent_hash = current.parent_hash();
            blocks.push(current.hash());
            current = db.fetch_block(parent_hash).map_err(|err| {
                if err.is_not_found() {
                    ExecutorError::BlockForBatchNotFound(parent_hash)
                } else {
                    err.into()
                }
            })?;
        }

        let mut messages = Vec::new();
        for hash in blocks.into_iter().rev() {
            messages.extend(db.fetch_l1_messages(hash)?);
        }
        Ok(messages)
    }

    /// Returns one synthetic transaction delivering each message to the L2 message bus. Nonces
    /// continue from the current nonce of the system account in `state`.
    pub fn create_synthetic_transactions(
        &self,
        messages: &[CrossChainMessage],
        state: &StateDb,
    ) -> Result<Vec<L2Transaction>, ExecutorError> {
        let first_nonce = state.nonce(&self.system_address());
        messages
            .iter()
            .zip(first_nonce..)
            .map(|(message, nonce)| {
                self.sign(TxRequest {
                    chain_id: self.chain_config.chain_id,
                    nonce,
                    gas_limit: SYNTHETIC_TX_GAS_LIMIT,
                    to: self.chain_config.l2_message_bus,
                    value: U256::ZERO,
                    input: alloy_rlp::encode(message).into(),
                })
            })
            .collect()
    }

    /// Returns the transaction deploying the L2 message bus, always the first transaction of the
    /// chain.
    pub fn message_bus_deploy_tx(&self) -> Result<L2Transaction, ExecutorError> {
        self.sign(TxRequest {
            chain_id: self.chain_config.chain_id,
            nonce: 0,
            gas_limit: SYNTHETIC_TX_GAS_LIMIT,
            to: Address::ZERO,
            value: U256::ZERO,
            input: Bytes::from_static(MESSAGE_BUS_CODE),
        })
    }

    /// Returns the messages published to L1 by the successful transactions of a batch.
    pub fn extract_outbound_messages(&self, receipts: &[Receipt]) -> CrossChainMessages {
        let topic = message_published_topic();
        receipts
            .iter()
            .filter(|receipt| receipt.success)
            .flat_map(|receipt| receipt.logs.iter())
            .filter(|log| {
                log.address == self.chain_config.l2_message_bus && log.topics.first() == Some(&topic)
            })
            .filter_map(|log| match CrossChainMessage::decode(&mut log.data.as_ref()) {
                Ok(message) => Some(message),
                Err(err) => {
                    tracing::warn!(target: "enclave::executor", ?err, "Failed to decode message bus log");
                    None
                }
            })
            .collect()
    }

    fn sign(&self, request: TxRequest) -> Result<L2Transaction, ExecutorError> {
        let signature = self.system_signer.sign_hash_sync(&request.signature_hash())?;
        Ok(request.into_signed(signature))
    }
}
