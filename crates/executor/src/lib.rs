//! Deterministic computation and execution of L2 batches.
//!
//! [`BatchExecutor::compute_batch`] is a pure function of its [`BatchExecutionContext`] and the
//! stored chain: computing the same context twice yields the same batch hash and receipts.
//! Persisting the post-state is a separate step, [`BatchExecutor::commit`].

mod context;
pub use context::BatchExecutionContext;

mod cross_chain;
pub use cross_chain::{message_published_topic, CrossChainProcessor};

mod error;
pub use error::ExecutorError;

mod executor;
pub use executor::{BatchExecutor, ComputedBatch};

mod genesis;
pub use genesis::Genesis;

mod metrics;
pub use metrics::ExecutorMetrics;

mod sandbox;
pub use sandbox::{TransactionExecutor, TxExecResults, TxExecutionError};

#[cfg(any(test, feature = "test-utils"))]
/// Common test helpers
pub mod test_utils;
