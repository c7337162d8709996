use crate::BlockProcessorError;

use alloy_primitives::B256;
use enclave_db::DatabaseReadOperations;
use enclave_primitives::{constants::L1_GENESIS_HEIGHT, BlockInfo, L1Block};

/// The outcome of a least common ancestor search between two L1 blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainFork {
    /// The block becoming the canonical head.
    pub new_canonical: BlockInfo,
    /// The previous canonical head.
    pub old_canonical: BlockInfo,
    /// The most recent block both branches share.
    pub common_ancestor: BlockInfo,
    /// The blocks of the new branch above the common ancestor, newest first.
    pub canonical_path: Vec<B256>,
    /// The blocks of the previous branch above the common ancestor, newest first.
    pub non_canonical_path: Vec<B256>,
}

impl ChainFork {
    /// Returns true if blocks of the previous canonical chain are abandoned.
    pub const fn is_fork(&self) -> bool {
        self.common_ancestor.number < self.old_canonical.number
    }
}

/// Returns the least common ancestor of `new` and `old`, walking both branches backwards by height.
///
/// `new` does not need to be stored, its ancestors do. The walk is bounded by L1 genesis.
pub fn find_common_ancestor<DB: DatabaseReadOperations>(
    db: &DB,
    new: &L1Block,
    old: &L1Block,
) -> Result<ChainFork, BlockProcessorError> {
    let mut canonical_path = Vec::new();
    let mut non_canonical_path = Vec::new();
    let mut new_branch = new.clone();
    let mut old_branch = old.clone();

    while new_branch.hash() != old_branch.hash() {
        let next = if new_branch.number() >= old_branch.number() {
            canonical_path.push(new_branch.hash());
            &mut new_branch
        } else {
            non_canonical_path.push(old_branch.hash());
            &mut old_branch
        };

        if next.number() <= L1_GENESIS_HEIGHT {
            tracing::error!(target: "enclave::block_processor", new = ?new.hash(), old = ?old.hash(), "Reached L1 genesis without finding a common ancestor");
            return Err(BlockProcessorError::NoCommonAncestor { new: new.hash(), old: old.hash() });
        }

        let parent_hash = next.parent_hash();
        *next = db.fetch_block(parent_hash).map_err(|err| {
            if err.is_not_found() {
                BlockProcessorError::BlockAncestorNotFound(parent_hash)
            } else {
                err.into()
            }
        })?;
    }

    Ok(ChainFork {
        new_canonical: BlockInfo::from(new),
        old_canonical: BlockInfo::from(old),
        common_ancestor: BlockInfo::from(&new_branch),
        canonical_path,
        non_canonical_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use enclave_db::{Database, DatabaseWriteOperations};
    use enclave_primitives::test_utils::{l1_chain, l1_chain_from};

    #[test]
    fn test_common_ancestor_of_sibling_branches() {
        let db = Database::new();
        // A -> B -> C on the canonical branch, A -> B' -> C' on the fork.
        let chain = l1_chain(100, 3);
        for block in &chain {
            db.store_block(block, &[], &[]).unwrap();
        }
        let fork = l1_chain_from(&chain[0], 2, 1);
        db.store_block(&fork[0], &[], &[]).unwrap();

        let result = find_common_ancestor(&db, &fork[1], &chain[2]).unwrap();
        assert!(result.is_fork());
        assert_eq!(result.common_ancestor, BlockInfo::from(&chain[0]));
        assert_eq!(result.canonical_path, vec![fork[1].hash(), fork[0].hash()]);
        assert_eq!(result.non_canonical_path, vec![chain[2].hash(), chain[1].hash()]);
    }

    #[test]
    fn test_common_ancestor_of_uneven_branches() {
        let db = Database::new();
        let chain = l1_chain(100, 4);
        for block in &chain {
            db.store_block(block, &[], &[]).unwrap();
        }
        // A single block on a fork from the second block.
        let fork = l1_chain_from(&chain[1], 1, 1);

        let result = find_common_ancestor(&db, &fork[0], &chain[3]).unwrap();
        assert_eq!(result.common_ancestor, BlockInfo::from(&chain[1]));
        assert_eq!(result.canonical_path, vec![fork[0].hash()]);
        assert_eq!(result.non_canonical_path, vec![chain[3].hash(), chain[2].hash()]);
    }

    #[test]
    fn test_missing_ancestor() {
        let db = Database::new();
        let chain = l1_chain(100, 3);
        db.store_block(&chain[2], &[], &[]).unwrap();
        let orphan = l1_chain(100, 2).pop().unwrap();

        let err = find_common_ancestor(&db, &orphan, &chain[2]).unwrap_err();
        assert!(matches!(err, BlockProcessorError::BlockAncestorNotFound(_)));
    }

    #[test]
    fn test_no_common_ancestor_above_genesis() {
        let db = Database::new();
        let left = l1_chain(0, 2);
        let right = l1_chain(0, 2);
        for block in left.iter().chain(&right) {
            db.store_block(block, &[], &[]).unwrap();
        }

        let err = find_common_ancestor(&db, &right[1], &left[1]).unwrap_err();
        assert!(err.is_fatal());
    }
}
