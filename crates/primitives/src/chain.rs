use crate::constants::{DEFAULT_BASE_FEE, DEFAULT_BATCH_GAS_LIMIT, DEFAULT_L2_CHAIN_ID};
use alloy_primitives::{address, Address};

/// The parameters of the L2 chain shared by every enclave of the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainConfig {
    /// The L2 chain id.
    pub chain_id: u64,
    /// The gas limit of every batch.
    pub gas_limit: u64,
    /// The base fee of every batch.
    pub base_fee: u64,
    /// The address of the L2 message bus contract.
    pub l2_message_bus: Address,
    /// The address of the L1 message bus contract.
    pub l1_message_bus: Address,
    /// The address of the L1 management contract rollups and control messages are sent to.
    pub management_contract: Address,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_L2_CHAIN_ID,
            gas_limit: DEFAULT_BATCH_GAS_LIMIT,
            base_fee: DEFAULT_BASE_FEE,
            l2_message_bus: address!("0x526c84529b2b8c11f57d93d3f5537aca3aecef9b"),
            l1_message_bus: address!("0xfafa1c4a4c3ed0a2e1bf2d5e9e5c6a0f0ec5a5b0"),
            management_contract: address!("0x7f0a33e3b7b6b5a1d6e9f8e0d4b4c2a3c1e0f9a8"),
        }
    }
}
