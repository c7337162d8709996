//! Storage for the enclave: L1 blocks, L2 batches, rollups, receipts and state.
//!
//! Components only depend on the [`DatabaseReadOperations`] and [`DatabaseWriteOperations`]
//! traits. [`Database`] is the in-memory implementation shipped with the enclave.

mod db;
pub use db::Database;

mod error;
pub use error::{DatabaseError, NotFound};

mod metrics;

mod operations;
pub use operations::{DatabaseReadOperations, DatabaseWriteOperations};

mod state;
pub use state::{Account, StateDb};
