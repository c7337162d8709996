//! Tests for the rejection of invalid L1 data by validators.

use alloy_primitives::{Address, B256};
use alloy_signer_local::PrivateKeySigner;
use enclave_db::DatabaseReadOperations;
use enclave_node::{
    spawn_enclave,
    test_utils::{rollup_block, validator},
    EnclaveNode, NodeError,
};
use enclave_primitives::{test_utils::l1_chain_from, BlockAndReceipts, Rollup};
use enclave_rollup::RollupError;
use enclave_signer::EnclaveSigner;
use eyre::Result;
use tests::{TestNetwork, VALIDATOR_ID};

#[test]
fn test_tampered_rollup_is_rejected() -> Result<()> {
    let mut network = TestNetwork::new(100)?;
    network.sequencer.create_batch(false)?;
    for _ in 0..2 {
        network.mine_empty()?;
        network.submit_transfer(1)?;
        network.sequencer.create_batch(true)?;
    }
    let mut rollup = network.sequencer.create_rollup(None)?;

    // The sequencer key signs a rollup whose second batch declares a forged root.
    rollup.batches[1].header.root = B256::repeat_byte(0x42);
    rollup.header.payload_hash = Rollup::payload_hash(&rollup.batches);
    let rollup = EnclaveSigner::new(network.signer.clone()).sign_rollup(rollup)?;
    let forged = rollup.batches[1].hash();

    let block = rollup_block(network.head(), vec![rollup]);
    let err = network.validator.submit_l1_block(&block, true).unwrap_err();
    assert!(matches!(err, NodeError::Rollup(RollupError::Executor(_))));

    let db = network.validator.components().db();
    assert!(db.fetch_batch(forged).unwrap_err().is_not_found());
    assert!(db.fetch_latest_rollup().unwrap_err().is_not_found());
    assert_eq!(network.validator.status()?.head_batch_seq, Some(1));
    Ok(())
}

#[test]
fn test_rollup_signed_by_unknown_key_is_ignored() -> Result<()> {
    let mut network = TestNetwork::new(100)?;
    network.sequencer.create_batch(false)?;
    let rollup = network.sequencer.create_rollup(None)?;
    let rollup = EnclaveSigner::new(PrivateKeySigner::random()).sign_rollup(rollup)?;

    let response = network.publish(rollup)?;
    assert_eq!(response.consumed_rollup, None);
    assert_eq!(network.validator.head_batch()?, None);
    Ok(())
}

#[test]
fn test_block_ingestion_is_idempotent() -> Result<()> {
    let mut network = TestNetwork::new(100)?;
    network.mine_empty()?;
    let status = network.validator.status()?;

    let block = BlockAndReceipts::all_successful(network.head().clone());
    let err = network.validator.submit_l1_block(&block, true).unwrap_err();
    assert!(err.is_duplicate());
    assert_eq!(network.validator.status()?, status);

    // A block whose parent was never ingested can be submitted again later.
    let orphan = l1_chain_from(network.head(), 2, 3).remove(1);
    let err = network
        .validator
        .submit_l1_block(&BlockAndReceipts::all_successful(orphan), true)
        .unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn test_batches_stream_to_validator_through_handles() -> Result<()> {
    let network = TestNetwork::new(100)?;
    let head = network.head().clone();
    let (sequencer_handle, sequencer_task) = spawn_enclave(network.sequencer);
    let (validator_handle, validator_task) = spawn_enclave(network.validator);
    let mut wallet = network.wallet;

    let genesis = sequencer_handle.create_batch(false).await?.unwrap();
    validator_handle.submit_batch(genesis).await?;

    for block in l1_chain_from(&head, 3, 0) {
        let block = BlockAndReceipts::all_successful(block);
        sequencer_handle.submit_l1_block(block.clone(), true).await?;
        validator_handle.submit_l1_block(block, true).await?;

        let tx = wallet.transfer(Address::repeat_byte(0x01), Default::default());
        sequencer_handle.submit_tx(tx).await?;
        let batch = sequencer_handle.create_batch(true).await?.unwrap();
        validator_handle.submit_batch(batch).await?;
    }

    let sequencer_status = sequencer_handle.status().await?;
    let validator_status = validator_handle.status().await?;
    assert_eq!(validator_status.head_batch, sequencer_status.head_batch);
    assert_eq!(validator_status.head_batch_seq, Some(4));
    assert_eq!(validator_status.l1_head, sequencer_status.l1_head);

    drop((sequencer_handle, validator_handle));
    sequencer_task.await?;
    validator_task.await?;
    Ok(())
}

#[test]
fn test_validator_without_attested_key_retries_rollups() -> Result<()> {
    let network = TestNetwork::new(100)?;
    network.sequencer.create_batch(false)?;
    let rollup = network.sequencer.create_rollup(None)?;

    // An enclave that missed the secret initialization cannot check the rollup signature yet.
    let late = validator(VALIDATOR_ID, &[network.wallet.address()])?;
    let first = network.chain[0].clone();
    late.submit_l1_block(&BlockAndReceipts::all_successful(first.clone()), true)?;
    let block = rollup_block(&first, vec![rollup]);
    let err = late.submit_l1_block(&block, true).unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}
