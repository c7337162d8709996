//! The enclave nodes.
//!
//! A [`Sequencer`] produces batches and rollups, a [`Validator`] recomputes them. Both ingest the
//! L1 chain through the same [`EnclaveComponents`] and can be driven from an async host through
//! an [`EnclaveHandle`].

mod args;
pub use args::{ChainArgs, EnclaveArgs, NodeType, SequencerArgs, SignerArgs};

mod components;
pub use components::EnclaveComponents;

mod config;
pub use config::EnclaveConfig;

mod error;
pub use error::NodeError;

mod handle;
pub use handle::{spawn_enclave, EnclaveCommand, EnclaveHandle};

mod metrics;
pub use metrics::{SequencerMetrics, ValidatorMetrics};

mod node;
pub use node::{BlockSubmissionResponse, EnclaveNode, EnclaveStatus};

mod sequencer;
pub use sequencer::Sequencer;

mod validator;
pub use validator::Validator;

#[cfg(any(test, feature = "test-utils"))]
/// Common test helpers
pub mod test_utils;
