use alloy_consensus::proofs::ordered_trie_root_with_encoder;
use alloy_primitives::{Address, B256, U256};
use alloy_rlp::{Encodable, RlpEncodable};
use std::collections::BTreeMap;

/// An L2 account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    /// The account nonce.
    pub nonce: u64,
    /// The account balance.
    pub balance: U256,
    /// The hash of the account code, zero for externally owned accounts.
    pub code_hash: B256,
    /// The account storage.
    pub storage: BTreeMap<B256, B256>,
}

impl Account {
    fn storage_root(&self) -> B256 {
        let slots: Vec<StorageLeaf> =
            self.storage.iter().map(|(slot, value)| StorageLeaf { slot: *slot, value: *value }).collect();
        ordered_trie_root_with_encoder(&slots, |leaf, buf| leaf.encode(buf))
    }
}

#[derive(RlpEncodable)]
struct StorageLeaf {
    slot: B256,
    value: B256,
}

#[derive(RlpEncodable)]
struct AccountLeaf {
    address: Address,
    nonce: u64,
    balance: U256,
    code_hash: B256,
    storage_root: B256,
}

/// A mutable view of the L2 state. Accounts are kept ordered so that [`StateDb::root`] only
/// depends on the state content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateDb {
    accounts: BTreeMap<Address, Account>,
}

impl StateDb {
    /// Returns an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a state holding the provided accounts.
    pub fn from_accounts(accounts: impl IntoIterator<Item = (Address, Account)>) -> Self {
        Self { accounts: accounts.into_iter().collect() }
    }

    /// Returns the account at `address`, if any.
    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    /// Returns the nonce of `address`.
    pub fn nonce(&self, address: &Address) -> u64 {
        self.accounts.get(address).map(|account| account.nonce).unwrap_or_default()
    }

    /// Returns the balance of `address`.
    pub fn balance(&self, address: &Address) -> U256 {
        self.accounts.get(address).map(|account| account.balance).unwrap_or_default()
    }

    /// Returns the value of the storage `slot` of `address`.
    pub fn storage(&self, address: &Address, slot: &B256) -> B256 {
        self.accounts
            .get(address)
            .and_then(|account| account.storage.get(slot).copied())
            .unwrap_or_default()
    }

    /// Increments the nonce of `address`.
    pub fn increment_nonce(&mut self, address: Address) {
        self.accounts.entry(address).or_default().nonce += 1;
    }

    /// Sets the balance of `address`.
    pub fn set_balance(&mut self, address: Address, balance: U256) {
        self.accounts.entry(address).or_default().balance = balance;
    }

    /// Moves `value` from `from` to `to`. Returns false and leaves the state untouched if `from`
    /// cannot cover it.
    pub fn transfer(&mut self, from: Address, to: Address, value: U256) -> bool {
        let Some(remaining) = self.balance(&from).checked_sub(value) else { return false };
        self.set_balance(from, remaining);
        let credited = self.balance(&to).saturating_add(value);
        self.set_balance(to, credited);
        true
    }

    /// Sets the code hash of `address`.
    pub fn set_code_hash(&mut self, address: Address, code_hash: B256) {
        self.accounts.entry(address).or_default().code_hash = code_hash;
    }

    /// Sets the storage `slot` of `address` to `value`.
    pub fn set_storage(&mut self, address: Address, slot: B256, value: B256) {
        self.accounts.entry(address).or_default().storage.insert(slot, value);
    }

    /// Returns the commitment to the state.
    pub fn root(&self) -> B256 {
        let leaves: Vec<AccountLeaf> = self
            .accounts
            .iter()
            .map(|(address, account)| AccountLeaf {
                address: *address,
                nonce: account.nonce,
                balance: account.balance,
                code_hash: account.code_hash,
                storage_root: account.storage_root(),
            })
            .collect();
        ordered_trie_root_with_encoder(&leaves, |leaf, buf| leaf.encode(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_consensus::EMPTY_ROOT_HASH;

    #[test]
    fn test_root_depends_on_content_only() {
        let (a, b) = (Address::repeat_byte(1), Address::repeat_byte(2));

        let mut first = StateDb::new();
        first.set_balance(a, U256::from(10));
        first.set_balance(b, U256::from(20));

        let mut second = StateDb::new();
        second.set_balance(b, U256::from(20));
        second.set_balance(a, U256::from(10));

        assert_eq!(first.root(), second.root());
        assert_ne!(first.root(), EMPTY_ROOT_HASH);
        assert_eq!(StateDb::new().root(), EMPTY_ROOT_HASH);
    }

    #[test]
    fn test_transfer_requires_balance() {
        let (a, b) = (Address::repeat_byte(1), Address::repeat_byte(2));
        let mut state = StateDb::new();
        state.set_balance(a, U256::from(5));

        assert!(!state.transfer(a, b, U256::from(6)));
        assert!(state.transfer(a, b, U256::from(5)));
        assert_eq!(state.balance(&a), U256::ZERO);
        assert_eq!(state.balance(&b), U256::from(5));
    }
}
