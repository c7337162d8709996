#![allow(missing_docs)]

use alloy_sol_types::sol;

// Management contract
sol! {
    #[derive(Debug, PartialEq, Eq)]
    function addRollup(bytes rollup_data) external;

    #[derive(Debug, PartialEq, Eq)]
    function initializeNetworkSecret(address enclave_id, bytes init_secret, bytes attestation) external;

    #[derive(Debug, PartialEq, Eq)]
    function requestNetworkSecret(bytes attestation) external;

    #[derive(Debug, PartialEq, Eq)]
    function respondNetworkSecret(
        address attester_id,
        address requester_id,
        bytes attester_sig,
        bytes response_secret
    ) external;
}

// L1 message bus
sol! {
    #[derive(Debug, PartialEq, Eq)]
    function publishMessage(uint64 nonce, uint64 topic, bytes payload, uint8 consistency_level) external;
}
