//! Builders for in-memory nodes and L1 blocks carrying control messages.

use crate::{EnclaveComponents, EnclaveConfig, NodeError, Sequencer, Validator};

use alloy_primitives::{address, Address, Bytes, U256};
use alloy_signer_local::PrivateKeySigner;
use enclave_block_processor::test_utils::AcceptAll;
use enclave_db::Database;
use enclave_executor::{test_utils::MockExecutor, Genesis};
use enclave_l1::{AttestationReport, InitializeSecretTx, ManagementContractTx};
use enclave_primitives::{test_utils::next_block, BlockAndReceipts, ChainConfig, L1Block, Rollup};
use enclave_signer::EnclaveSigner;
use std::sync::Arc;

/// The enclave id of the test sequencer.
pub const SEQUENCER_ID: Address = address!("0x5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e");

/// The L1 account publishing the test control messages.
pub const L1_PUBLISHER: Address = address!("0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");

/// The balance of the accounts funded at genesis.
pub const INITIAL_BALANCE: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// A sequencer on top of in-memory storage and the mock sandbox.
pub type TestSequencer = Sequencer<Arc<Database>, MockExecutor, AcceptAll>;

/// A validator on top of in-memory storage and the mock sandbox.
pub type TestValidator = Validator<Arc<Database>, MockExecutor, AcceptAll>;

/// Returns the configuration of the enclave `enclave_id` in a network sequenced by
/// [`SEQUENCER_ID`].
pub fn test_config(enclave_id: Address) -> EnclaveConfig {
    EnclaveConfig { enclave_id, sequencer_id: SEQUENCER_ID, ..Default::default() }
}

/// Returns a genesis allocating [`INITIAL_BALANCE`] to each of the `funded` accounts.
pub fn test_genesis(funded: &[Address]) -> Genesis {
    Genesis::new(funded.iter().map(|address| (*address, INITIAL_BALANCE)))
}

fn components(
    enclave_id: Address,
    funded: &[Address],
) -> Result<EnclaveComponents<Arc<Database>, MockExecutor, AcceptAll>, NodeError> {
    EnclaveComponents::new(
        Arc::new(Database::new()),
        MockExecutor,
        AcceptAll,
        test_genesis(funded),
        test_config(enclave_id),
    )
}

/// Returns a sequencer signing with `signer`.
pub fn sequencer(signer: PrivateKeySigner, funded: &[Address]) -> Result<TestSequencer, NodeError> {
    Sequencer::new(components(SEQUENCER_ID, funded)?, EnclaveSigner::new(signer))
}

/// Returns a validator with the provided enclave id. It does not know the sequencer key until it
/// ingests the network secret initialization, see [`secret_block`].
pub fn validator(enclave_id: Address, funded: &[Address]) -> Result<TestValidator, NodeError> {
    Ok(Validator::new(components(enclave_id, funded)?))
}

/// Returns a successful block extending `parent` that publishes `rollups` to the management
/// contract.
pub fn rollup_block(parent: &L1Block, rollups: Vec<Rollup>) -> BlockAndReceipts {
    let management_contract = ChainConfig::default().management_contract;
    let transactions = rollups
        .into_iter()
        .enumerate()
        .map(|(nonce, rollup)| {
            ManagementContractTx::from(rollup).into_l1_transaction(
                L1_PUBLISHER,
                nonce as u64,
                management_contract,
            )
        })
        .collect();
    BlockAndReceipts::all_successful(next_block(parent, 0, transactions))
}

/// Returns a successful block extending `parent` in which the sequencer initializes the network
/// secret, attesting `sequencer_key` as its signing key.
pub fn secret_block(parent: &L1Block, sequencer_key: Address) -> BlockAndReceipts {
    let init = InitializeSecretTx {
        enclave_id: SEQUENCER_ID,
        init_secret: Bytes::from_static(b"secret"),
        attestation: AttestationReport {
            report: Bytes::from_static(b"report"),
            enclave_id: SEQUENCER_ID,
            signing_key: sequencer_key,
            host_address: "127.0.0.1:10000".to_string(),
        },
    };
    let tx = ManagementContractTx::InitializeSecret(init).into_l1_transaction(
        L1_PUBLISHER,
        0,
        ChainConfig::default().management_contract,
    );
    BlockAndReceipts::all_successful(next_block(parent, 0, vec![tx]))
}
