//! Tests for the production of rollups by the sequencer and their consumption by validators.

use alloy_primitives::Address;
use enclave_db::DatabaseReadOperations;
use enclave_node::{test_utils::validator, EnclaveNode};
use enclave_primitives::{Batch, BlockAndReceipts};
use eyre::Result;
use tests::TestNetwork;

/// Mines `count` blocks, each followed by a batch carrying one transfer.
fn produce_batches(network: &mut TestNetwork, count: usize) -> Result<Vec<Batch>> {
    let mut batches = Vec::with_capacity(count);
    for _ in 0..count {
        network.mine_empty()?;
        network.submit_transfer(1)?;
        let batch = network.sequencer.create_batch(true)?.ok_or_else(|| eyre::eyre!("no batch"))?;
        batches.push(batch);
    }
    Ok(batches)
}

#[test]
fn test_rollup_reconstructs_batches() -> Result<()> {
    let mut network = TestNetwork::new(100)?;
    let genesis = network.sequencer.create_batch(false)?.unwrap();
    assert_eq!(genesis.seq_no(), 1);
    assert_eq!(network.head().number(), 100);
    network.validator.submit_batch(&genesis)?;

    let batches = produce_batches(&mut network, 4)?;
    for (batch, height) in batches.iter().zip(101..) {
        let anchor = network.sequencer.components().db().fetch_block(batch.l1_proof())?;
        assert_eq!(anchor.number(), height);
    }

    let rollup = network.sequencer.create_rollup(Some(2))?;
    assert_eq!(rollup.header.first_batch_seq_no, 2);
    assert_eq!(rollup.header.last_batch_seq_no, 5);
    let response = network.publish(rollup.clone())?;
    assert_eq!(response.consumed_rollup, Some(rollup.hash()));

    let db = network.validator.components().db();
    for (batch, seq_no) in batches.iter().zip(2..) {
        let stored = db.fetch_batch_by_seq_no(seq_no)?;
        assert_eq!(stored.hash(), batch.hash());
        assert_eq!(stored.seq_no(), seq_no);
    }
    assert!(db.fetch_batch_by_seq_no(6).unwrap_err().is_not_found());
    assert_eq!(network.validator.status()?.head_batch_seq, Some(5));
    assert_eq!(network.validator.head_batch()?, network.sequencer.head_batch()?);
    Ok(())
}

#[test]
fn test_consecutive_rollups_link_to_each_other() -> Result<()> {
    let mut network = TestNetwork::new(100)?;
    network.sequencer.create_batch(false)?;
    produce_batches(&mut network, 2)?;

    let first = network.sequencer.create_rollup(None)?;
    assert_eq!(first.header.first_batch_seq_no, 1);
    assert_eq!(first.header.last_batch_seq_no, 3);
    network.publish(first.clone())?;
    assert_eq!(network.validator.status()?.head_batch_seq, Some(3));

    produce_batches(&mut network, 2)?;
    let second = network.sequencer.create_rollup(None)?;
    assert_eq!(second.header.parent_hash, first.hash());
    assert_eq!(second.header.first_batch_seq_no, 4);
    assert_eq!(second.header.last_batch_seq_no, 5);
    network.publish(second.clone())?;

    let db = network.validator.components().db();
    assert_eq!(db.fetch_latest_rollup()?.hash(), second.hash());
    assert_eq!(network.validator.head_batch()?, network.sequencer.head_batch()?);
    Ok(())
}

#[test]
fn test_validators_agree() -> Result<()> {
    let mut network = TestNetwork::new(100)?;
    network.sequencer.create_batch(false)?;
    produce_batches(&mut network, 3)?;
    let rollup = network.sequencer.create_rollup(None)?;
    network.publish(rollup)?;

    // A second validator replaying the same L1 chain reaches the same head.
    let late = validator(Address::repeat_byte(0x0b), &[network.wallet.address()])?;
    for block in &network.chain {
        late.submit_l1_block(&BlockAndReceipts::all_successful(block.clone()), true)?;
    }
    let head = late.head_batch()?.unwrap();
    assert_eq!(Some(&head), network.validator.head_batch()?.as_ref());
    assert_eq!(head.seq_no(), 4);
    Ok(())
}
