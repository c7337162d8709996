//! Tests for L1 reorgs.

use enclave_db::DatabaseReadOperations;
use enclave_node::EnclaveNode;
use enclave_primitives::{test_utils::l1_chain_from, BlockAndReceipts};
use eyre::Result;
use tests::TestNetwork;

#[test]
fn test_reorg_replays_batches_on_new_branch() -> Result<()> {
    let mut network = TestNetwork::new(100)?;
    let genesis = network.sequencer.create_batch(false)?.unwrap();
    let anchor = network.head().clone();

    // A -> B -> C
    let mut orphans = Vec::new();
    for _ in 0..2 {
        network.mine_empty()?;
        network.submit_transfer(1)?;
        orphans.push(network.sequencer.create_batch(true)?.unwrap());
    }

    // A -> B' -> C'
    let fork = l1_chain_from(&anchor, 2, 1);
    for block in &fork {
        let response = network.mine(BlockAndReceipts::all_successful(block.clone()))?;
        assert_eq!(response.consumed_rollup, None);
    }
    assert_eq!(network.sequencer.status()?.l1_head.map(|head| head.hash), Some(fork[1].hash()));

    let head = network.sequencer.create_batch(false)?.unwrap();
    assert_eq!(head.seq_no(), 6);
    assert_eq!(head.l1_proof(), fork[1].hash());

    let db = network.sequencer.components().db();
    let mut replays = Vec::new();
    let mut current = db.fetch_batch(head.parent_hash())?;
    while current.hash() != genesis.hash() {
        let parent = db.fetch_batch(current.parent_hash())?;
        replays.push(current);
        current = parent;
    }
    replays.reverse();
    assert_eq!(replays.len(), orphans.len());
    for (replay, orphan) in replays.iter().zip(&orphans) {
        assert_eq!(replay.transactions, orphan.transactions);
        assert_eq!(replay.number(), orphan.number());
        assert_eq!(replay.l1_proof(), fork[1].hash());
    }
    assert_eq!(db.fetch_head_batch_for_block(fork[1].hash())?.hash(), head.hash());

    // The validator follows the rollup of every batch, orphans included, and ends on the
    // replayed branch.
    let rollup = network.sequencer.create_rollup(None)?;
    assert_eq!(rollup.header.first_batch_seq_no, 1);
    assert_eq!(rollup.header.last_batch_seq_no, 6);
    network.publish(rollup)?;

    let validator_db = network.validator.components().db();
    assert_eq!(network.validator.head_batch()?, Some(head.clone()));
    for replay in &replays {
        assert_eq!(validator_db.fetch_batch_by_height(replay.number())?.hash(), replay.hash());
    }
    assert_eq!(validator_db.fetch_batch_by_seq_no(2)?.hash(), orphans[0].hash());
    Ok(())
}

#[test]
fn test_reorg_without_batches_on_abandoned_branch() -> Result<()> {
    let mut network = TestNetwork::new(100)?;
    network.sequencer.create_batch(false)?;
    let anchor = network.head().clone();
    network.mine_empty()?;

    for block in l1_chain_from(&anchor, 2, 1) {
        network.mine(BlockAndReceipts::all_successful(block))?;
    }

    // Nothing was anchored to the abandoned block, the new batch extends genesis.
    let batch = network.sequencer.create_batch(false)?.unwrap();
    assert_eq!(batch.seq_no(), 2);
    assert_eq!(batch.number(), 1);
    assert_eq!(batch.l1_proof(), network.head().hash());
    Ok(())
}
