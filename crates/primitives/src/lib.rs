//! Primitive types for the enclave.

pub use batch::{Batch, BatchHeader};
mod batch;

pub use block::{BlockAndReceipts, BlockInfo, L1Block, L1BlockHeader, L1Receipt, L1Transaction};
mod block;

pub use chain::ChainConfig;
mod chain;

pub mod constants;

pub use cross_chain::{CrossChainMessage, CrossChainMessages};
mod cross_chain;

pub use limiter::{BatchSizeLimiter, RollupLimiter, RollupSizeLimiter, UnboundedRollupLimiter};
mod limiter;

pub use proofs::{receipts_root, transactions_root};
mod proofs;

pub use receipt::{Log, Receipt, Receipts};
mod receipt;

pub use rollup::{Rollup, RollupHeader};
mod rollup;

pub use signature::SignatureAsBytes;
mod signature;

pub use transaction::{L2Transaction, TxRequest};
mod transaction;

#[cfg(any(test, feature = "test-utils"))]
/// Common test helpers
pub mod test_utils;
