//! Constants shared by every component of the enclave.

/// The height of the genesis batch.
pub const L2_GENESIS_HEIGHT: u64 = 0;

/// The sequencer order number of the genesis batch.
pub const L2_GENESIS_SEQ_NO: u64 = 1;

/// The lowest L1 height the enclave will ever walk back to.
pub const L1_GENESIS_HEIGHT: u64 = 0;

/// The number of batches after which a transaction included in a batch is considered final and
/// can be dropped from the mempool.
pub const HEIGHT_COMMITTED_BLOCKS: u64 = 15;

/// The default maximum encoded size of the transactions of a batch, in bytes.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 36 * 1024;

/// The default maximum encoded size of a rollup, in bytes.
pub const DEFAULT_MAX_ROLLUP_SIZE: usize = 128 * 1024;

/// The default L2 chain id.
pub const DEFAULT_L2_CHAIN_ID: u64 = 443;

/// The default batch gas limit.
pub const DEFAULT_BATCH_GAS_LIMIT: u64 = 30_000_000;

/// The default batch base fee.
pub const DEFAULT_BASE_FEE: u64 = 1_000_000_000;
