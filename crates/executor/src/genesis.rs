use alloy_primitives::{Address, U256};
use enclave_db::StateDb;
use std::collections::BTreeMap;

/// The initial L2 state: balances allocated at genesis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Genesis {
    /// The preallocated balances.
    pub alloc: BTreeMap<Address, U256>,
}

impl Genesis {
    /// Returns a genesis funding the provided accounts.
    pub fn new(alloc: impl IntoIterator<Item = (Address, U256)>) -> Self {
        Self { alloc: alloc.into_iter().collect() }
    }

    /// Returns the genesis state.
    pub fn state(&self) -> StateDb {
        let mut state = StateDb::new();
        for (address, balance) in &self.alloc {
            state.set_balance(*address, *balance);
        }
        state
    }
}
