//! Decoding of the L1 transactions the enclave reacts to: rollups and network secret control
//! messages sent to the management contract, and cross chain messages sent to the L1 message bus.

mod abi;

mod attestation;
pub use attestation::{AttestationReport, InitializeSecretTx, RequestSecretTx, RespondSecretTx};

mod management;
pub use management::ManagementContractTx;

mod message_bus;
pub use message_bus::{publish_message_calldata, try_decode_cross_chain_message};
