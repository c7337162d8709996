use alloy_primitives::B256;
use enclave_db::StateDb;
use enclave_primitives::{BatchHeader, ChainConfig, L2Transaction, Receipt};
use std::collections::HashMap;

/// The outcome of each executed transaction, keyed by transaction hash.
pub type TxExecResults = HashMap<B256, Result<Receipt, TxExecutionError>>;

/// The reason a transaction could not be executed at all. Such transactions are excluded from
/// the batch; a reverted transaction is not an error and yields a receipt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TxExecutionError {
    /// The sender could not be recovered from the signature.
    #[error("invalid signature")]
    InvalidSignature,
    /// The transaction targets another chain.
    #[error("invalid chain id {0}")]
    InvalidChainId(u64),
    /// The transaction nonce is not the next nonce of the sender.
    #[error("nonce mismatch: expected {expected}, got {got}")]
    NonceMismatch {
        /// The next nonce of the sender.
        expected: u64,
        /// The nonce of the transaction.
        got: u64,
    },
    /// The sender cannot pay for the transaction.
    #[error("insufficient funds")]
    InsufficientFunds,
    /// The batch has no gas left for the transaction.
    #[error("batch gas limit reached")]
    GasLimitReached,
    /// The sandbox failed for another reason.
    #[error("{0}")]
    Other(String),
}

/// The execution sandbox: turns transactions and a pre-state into receipts.
///
/// Implementations must be deterministic: the same transactions executed on the same state under
/// the same header always yield the same receipts and post-state. Transactions that yield an
/// error must leave the state untouched.
#[auto_impl::auto_impl(&, Arc)]
pub trait TransactionExecutor: Send + Sync {
    /// Executes `transactions` in order on `state`. `from_tx_index` is the position of the first
    /// transaction in the batch.
    fn execute_transactions(
        &self,
        transactions: &[L2Transaction],
        state: &mut StateDb,
        header: &BatchHeader,
        chain_config: &ChainConfig,
        from_tx_index: usize,
    ) -> TxExecResults;
}
