use alloy_primitives::{Address, Bytes};
use alloy_rlp::{RlpDecodable, RlpEncodable};

/// The attestation an enclave publishes to join the network.
#[derive(Debug, Clone, Default, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct AttestationReport {
    /// The raw attestation report produced by the enclave hardware.
    pub report: Bytes,
    /// The id of the attested enclave.
    pub enclave_id: Address,
    /// The address of the key the enclave signs batches and rollups with.
    pub signing_key: Address,
    /// The address the host of the enclave can be reached at.
    pub host_address: String,
}

/// The first enclave of the network publishes the network secret and its attestation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializeSecretTx {
    /// The id of the enclave initializing the network.
    pub enclave_id: Address,
    /// The encrypted initial secret.
    pub init_secret: Bytes,
    /// The attestation of the enclave.
    pub attestation: AttestationReport,
}

/// An enclave requests the network secret by publishing its attestation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSecretTx {
    /// The attestation of the requesting enclave.
    pub attestation: AttestationReport,
}

/// An attested enclave answers a secret request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RespondSecretTx {
    /// The id of the responding enclave.
    pub attester_id: Address,
    /// The id of the requesting enclave.
    pub requester_id: Address,
    /// The signature of the responding enclave.
    pub attester_sig: Bytes,
    /// The secret, encrypted for the requesting enclave.
    pub response_secret: Bytes,
}
